#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Error taxonomy for loading, capturing and checking.

use std::path::PathBuf;

use thiserror::Error;

/// A malformed or unreadable test specification.
#[derive(Debug, Error)]
pub enum SpecError {
    /// The spec file could not be read.
    #[error("could not read test spec {}", path.display())]
    Unreadable {
        /// Location that failed to read.
        path:   PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// The spec file is not valid JSON or misses required fields.
    #[error("malformed test spec {}: {source}", path.display())]
    Malformed {
        /// Offending spec.
        path:   PathBuf,
        /// Underlying parse failure.
        #[source]
        source: serde_json::Error,
    },
    /// The spec declares no cases.
    #[error("test spec {} has no cases", path.display())]
    NoCases {
        /// Offending spec.
        path: PathBuf,
    },
    /// Two cases in one spec share a name.
    #[error("test spec {} declares case `{case}` more than once", path.display())]
    DuplicateCase {
        /// Offending spec.
        path: PathBuf,
        /// The repeated case name.
        case: String,
    },
    /// A case is structurally invalid.
    #[error("case `{case}` in {} is invalid: {reason}", path.display())]
    InvalidCase {
        /// Offending spec.
        path:   PathBuf,
        /// Name of the invalid case.
        case:   String,
        /// What is wrong with it.
        reason: String,
    },
    /// A directory contained no spec files.
    #[error("no test specs matching `{pattern}`")]
    NoSpecs {
        /// The glob pattern that matched nothing.
        pattern: String,
    },
    /// The discovery pattern itself was invalid.
    #[error("invalid spec pattern `{pattern}`: {source}")]
    Pattern {
        /// The rejected pattern.
        pattern: String,
        /// Underlying glob failure.
        #[source]
        source:  glob::PatternError,
    },
}

/// A runtime fault raised by candidate code while a statement is evaluated.
///
/// Faults are recorded as failed steps and never abort a check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CaseFault {
    /// Message shown as the "actual" text of the failing step.
    pub message: String,
}

impl CaseFault {
    /// Creates a fault carrying `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Failure to acquire or release the output capture slot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// The current thread already owns the capture slot.
    #[error("output capture is already active on this thread")]
    Nested,
    /// A previous owner panicked while holding the slot lock.
    #[error("output capture state was poisoned")]
    Poisoned,
}

/// Failures of a check operation as a whole.
#[derive(Debug, Error)]
pub enum CheckError {
    /// A spec could not be loaded.
    #[error(transparent)]
    Spec(#[from] SpecError),
    /// Output could not be captured safely.
    #[error(transparent)]
    Capture(#[from] CaptureError),
    /// The candidate script could not be read.
    #[error("could not read candidate script {}", path.display())]
    Script {
        /// The script location.
        path:   PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// No spec exists for the requested question.
    #[error("no test spec for question `{question}` in {}", dir.display())]
    UnknownQuestion {
        /// The requested question.
        question: String,
        /// The directory that was searched.
        dir:      PathBuf,
    },
}
