#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Loading question test specifications.
//!
//! A spec is a JSON document naming an ordered list of cases. Each case is
//! either a doctest transcript (`code`) or an explicit list of `steps`.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::error::SpecError;

/// Doctest transcript parsing.
pub mod doctest;

/// One statement and the text it is expected to render as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Code evaluated against the environment.
    pub statement: String,
    /// Expected rendered text; empty means "renders as nothing".
    #[serde(default)]
    pub expected:  String,
    /// 1-based line of the statement within the case transcript.
    #[serde(skip)]
    pub line:      usize,
}

/// An ordered group of steps that passes or fails as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize)]
#[builder(on(String, into))]
pub struct Case {
    /// Name, unique within its spec.
    name:   String,
    /// Whether failure details are withheld from reports.
    #[builder(default)]
    hidden: bool,
    /// Steps in evaluation order.
    steps:  Vec<Step>,
}

impl Case {
    /// Case name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether failure details are withheld from reports.
    pub fn hidden(&self) -> bool {
        self.hidden
    }

    /// Steps in evaluation order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Builds a case from `(statement, expected)` pairs, numbering lines as
    /// they would appear in the equivalent transcript.
    pub fn from_pairs<S, E>(
        name: impl Into<String>,
        pairs: impl IntoIterator<Item = (S, E)>,
    ) -> Self
    where
        S: Into<String>,
        E: Into<String>,
    {
        let steps = pairs
            .into_iter()
            .map(|(statement, expected)| Step {
                statement: statement.into(),
                expected:  expected.into(),
                line:      0,
            })
            .collect();
        Case::builder()
            .name(name)
            .steps(number_steps(steps))
            .build()
    }
}

/// Assigns transcript line numbers to explicitly listed steps.
fn number_steps(mut steps: Vec<Step>) -> Vec<Step> {
    let mut line = 1;
    for step in &mut steps {
        step.line = line;
        line += step.statement.lines().count().max(1) + step.expected.lines().count();
    }
    steps
}

/// Every case for one question.
#[derive(Debug, Clone, PartialEq, Builder, Serialize)]
#[builder(on(String, into))]
pub struct TestSpec {
    /// Question name.
    name:   String,
    /// Where the spec was loaded from, shown verbatim in reports.
    #[builder(into)]
    path:   PathBuf,
    /// Nominal point value. Grading uses equal per-case weight regardless.
    points: Option<f64>,
    /// Cases in declaration order.
    cases:  Vec<Case>,
}

/// Raw on-disk form of a step list entry.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawStep {
    /// Code to evaluate.
    statement: String,
    /// Expected rendering.
    #[serde(default)]
    expected:  String,
}

/// Raw on-disk form of a case.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCase {
    /// Case name.
    name:   String,
    /// Doctest transcript.
    code:   Option<String>,
    /// Explicit steps.
    steps:  Option<Vec<RawStep>>,
    /// Hidden flag.
    #[serde(default)]
    hidden: bool,
}

/// Raw on-disk form of a spec.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSpec {
    /// Question name; defaults to the file stem.
    name:   Option<String>,
    /// Nominal points.
    points: Option<f64>,
    /// Hides every case.
    #[serde(default)]
    hidden: bool,
    /// Cases.
    cases:  Vec<RawCase>,
}

impl TestSpec {
    /// Question name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Location the spec was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Nominal point value, if declared.
    pub fn points(&self) -> Option<f64> {
        self.points
    }

    /// Cases in declaration order.
    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    /// Reads and validates the spec at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SpecError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| SpecError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let spec = Self::parse(path, &source)?;
        tracing::debug!(spec = %spec.name, cases = spec.cases.len(), "loaded test spec");
        Ok(spec)
    }

    /// Validates spec `source` as if it had been read from `path`.
    pub fn parse(path: impl AsRef<Path>, source: &str) -> Result<Self, SpecError> {
        let path = path.as_ref();
        let raw: RawSpec = serde_json::from_str(source).map_err(|source| SpecError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;

        if raw.cases.is_empty() {
            return Err(SpecError::NoCases {
                path: path.to_path_buf(),
            });
        }

        let mut seen = HashSet::new();
        let mut cases = Vec::with_capacity(raw.cases.len());
        for raw_case in raw.cases {
            if !seen.insert(raw_case.name.clone()) {
                return Err(SpecError::DuplicateCase {
                    path: path.to_path_buf(),
                    case: raw_case.name,
                });
            }
            cases.push(build_case(path, raw_case, raw.hidden)?);
        }

        let name = raw.name.unwrap_or_else(|| question_name(path));

        Ok(TestSpec::builder()
            .name(name)
            .path(path)
            .maybe_points(raw.points)
            .cases(cases)
            .build())
    }

    /// Number of cases; never zero for a loaded spec.
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Always false for a loaded spec.
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

/// Validates one raw case.
fn build_case(path: &Path, raw: RawCase, spec_hidden: bool) -> Result<Case, SpecError> {
    let invalid = |case: &str, reason: String| SpecError::InvalidCase {
        path: path.to_path_buf(),
        case: case.to_string(),
        reason,
    };

    let steps = match (raw.code, raw.steps) {
        (Some(code), None) => doctest::parse(&code).map_err(|e| {
            invalid(&raw.name, format!("line {}: {}", e.line, e.reason))
        })?,
        (None, Some(steps)) => number_steps(
            steps
                .into_iter()
                .map(|s| Step {
                    statement: s.statement,
                    expected:  s.expected,
                    line:      0,
                })
                .collect(),
        ),
        (Some(_), Some(_)) => {
            return Err(invalid(&raw.name, "gives both `code` and `steps`".into()));
        }
        (None, None) => {
            return Err(invalid(&raw.name, "needs either `code` or `steps`".into()));
        }
    };

    if steps.is_empty() {
        return Err(invalid(&raw.name, "has no steps".into()));
    }

    Ok(Case::builder()
        .name(raw.name)
        .hidden(raw.hidden || spec_hidden)
        .steps(steps)
        .build())
}

/// Question name for a spec file: its stem.
pub fn question_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Finds spec files with `extension` directly inside `dir`, sorted by path.
pub fn discover(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, SpecError> {
    let pattern = dir.join(format!("*.{extension}")).display().to_string();
    let mut paths: Vec<PathBuf> = glob::glob(&pattern)
        .map_err(|source| SpecError::Pattern {
            pattern: pattern.clone(),
            source,
        })?
        .filter_map(Result::ok)
        .filter(|p| p.is_file())
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(SpecError::NoSpecs { pattern });
    }
    Ok(paths)
}

/// Loads every spec in `dir`, in path order.
pub fn load_dir(dir: &Path, extension: &str) -> Result<Vec<TestSpec>, SpecError> {
    discover(dir, extension)?
        .into_iter()
        .map(TestSpec::load)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_both_case_forms() {
        let source = r#"{
            "points": 2,
            "cases": [
                { "name": "q1 - 1", "code": "\n>>> square(3)\n9\n" },
                { "name": "q1 - 2", "hidden": true, "steps": [
                    { "statement": "let x = 4;" },
                    { "statement": "square(x)", "expected": "16" }
                ] }
            ]
        }"#;
        let spec = TestSpec::parse("tests/q1.json", source).unwrap();
        assert_eq!(spec.name(), "q1");
        assert_eq!(spec.points(), Some(2.0));
        assert_eq!(spec.len(), 2);
        assert_eq!(spec.cases()[0].steps()[0].line, 2);
        assert!(spec.cases()[1].hidden());
        let lines: Vec<usize> = spec.cases()[1].steps().iter().map(|s| s.line).collect();
        assert_eq!(lines, vec![1, 2]);
    }

    #[test]
    fn misspelled_keys_are_rejected() {
        let case_key = r#"{ "cases": [ { "name": "a", "hiden": true, "code": ">>> 1\n1" } ] }"#;
        let err = TestSpec::parse("a.json", case_key).unwrap_err();
        assert!(matches!(err, SpecError::Malformed { .. }), "{err}");

        let spec_key = r#"{ "pionts": 1, "cases": [ { "name": "a", "code": ">>> 1\n1" } ] }"#;
        let err = TestSpec::parse("a.json", spec_key).unwrap_err();
        assert!(matches!(err, SpecError::Malformed { .. }), "{err}");
    }

    #[test]
    fn spec_hidden_flag_reaches_every_case() {
        let source = r#"{ "name": "h", "hidden": true, "cases": [
            { "name": "a", "steps": [ { "statement": "1", "expected": "1" } ] }
        ] }"#;
        let spec = TestSpec::parse("h.json", source).unwrap();
        assert!(spec.cases()[0].hidden());
    }

    #[test]
    fn rejects_structural_problems() {
        let cases = [
            (r#"{ "cases": [] }"#, "no cases"),
            (r#"{ "cases": [ { "name": "a" } ] }"#, "needs either"),
            (r#"{ "cases": [ { "name": "a", "code": "prose" } ] }"#, "has no steps"),
            (
                r#"{ "cases": [ { "name": "a", "code": ">>> 1\n1", "steps": [] } ] }"#,
                "both",
            ),
            (
                r#"{ "cases": [
                    { "name": "a", "code": ">>> 1\n1" },
                    { "name": "a", "code": ">>> 2\n2" } ] }"#,
                "more than once",
            ),
            (r#"{ "cases": [ { "code": ">>> 1" } ] }"#, "missing field `name`"),
            (r#"not json"#, "malformed"),
        ];
        for (source, needle) in cases {
            let err = TestSpec::parse("bad.json", source).unwrap_err();
            assert!(err.to_string().contains(needle), "{source}: {err}");
        }
    }

    #[test]
    fn pairs_are_numbered_like_a_transcript() {
        let case = Case::from_pairs("c", [("let x = 1;", ""), ("x\n+ 1", "2"), ("x", "1")]);
        let lines: Vec<usize> = case.steps().iter().map(|s| s.line).collect();
        assert_eq!(lines, vec![1, 2, 5]);
    }
}
