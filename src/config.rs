#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Settings for a check run, read from the process environment.

use std::str::FromStr;

use bon::Builder;
use tracing::Level;

/// Extension of spec files discovered in a directory.
pub const DEFAULT_SPEC_EXTENSION: &str = "json";

/// Environment variable overriding the spec file extension.
pub const SPEC_EXTENSION_VAR: &str = "GRADECHECK_SPEC_EXTENSION";

/// Environment variable holding the log level of the binary.
pub const LOG_VAR: &str = "GRADECHECK_LOG";

/// Environment variable capping Rhai operations per statement.
pub const MAX_OPERATIONS_VAR: &str = "GRADECHECK_MAX_OPERATIONS";

/// Settings shared by the batch and embedded check paths.
#[derive(Debug, Clone, Builder)]
#[builder(on(String, into))]
pub struct CheckConfig {
    /// Extension of spec files, without the dot.
    #[builder(default = DEFAULT_SPEC_EXTENSION.to_string())]
    spec_extension: String,
    /// Verbosity of diagnostics written to stderr.
    #[builder(default = Level::WARN)]
    log_level:      Level,
    /// Operation cap per evaluated statement; zero means unlimited.
    #[builder(default)]
    max_operations: u64,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl CheckConfig {
    /// Reads overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads overrides through `lookup`; unset, blank or unparsable values
    /// keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };

        let spec_extension = get(SPEC_EXTENSION_VAR)
            .map(|ext| ext.trim_start_matches('.').to_owned())
            .unwrap_or_else(|| DEFAULT_SPEC_EXTENSION.to_string());
        let log_level = get(LOG_VAR)
            .and_then(|v| Level::from_str(&v).ok())
            .unwrap_or(Level::WARN);
        let max_operations = get(MAX_OPERATIONS_VAR)
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or_default();

        Self::builder()
            .spec_extension(spec_extension)
            .log_level(log_level)
            .max_operations(max_operations)
            .build()
    }

    /// Extension of spec files, without the dot.
    pub fn spec_extension(&self) -> &str {
        &self.spec_extension
    }

    /// Verbosity of diagnostics.
    pub fn log_level(&self) -> Level {
        self.log_level
    }

    /// Operation cap per evaluated statement; zero means unlimited.
    pub fn max_operations(&self) -> u64 {
        self.max_operations
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = CheckConfig::from_lookup(|_| None);
        assert_eq!(config.spec_extension(), "json");
        assert_eq!(config.log_level(), Level::WARN);
        assert_eq!(config.max_operations(), 0);
    }

    #[test]
    fn reads_and_cleans_overrides() {
        let vars: HashMap<&str, &str> = [
            (SPEC_EXTENSION_VAR, " .spec "),
            (LOG_VAR, "debug"),
            (MAX_OPERATIONS_VAR, "not a number"),
        ]
        .into_iter()
        .collect();
        let config = CheckConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.spec_extension(), "spec");
        assert_eq!(config.log_level(), Level::DEBUG);
        assert_eq!(config.max_operations(), 0);
    }
}
