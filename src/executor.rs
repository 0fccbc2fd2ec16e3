#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Runs cases against an environment.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{
    scripting::Evaluator,
    spec::{Case, TestSpec},
    value::Environment,
};

/// Where and how a case stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepFailure {
    /// 0-based index of the failing step within its case.
    pub step:      usize,
    /// Transcript line of the failing statement.
    pub line:      usize,
    /// The failing statement.
    pub statement: String,
    /// What the statement should have rendered as.
    pub expected:  String,
    /// What it rendered as, or the fault message.
    pub actual:    String,
    /// Fault raised by the statement, if that is why it failed.
    pub fault:     Option<String>,
}

/// Result of running one case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseOutcome {
    /// Case name.
    pub name:    String,
    /// 0-based position of the case within its spec.
    pub index:   usize,
    /// Whether failure details are withheld from reports.
    pub hidden:  bool,
    /// Set when the case failed.
    pub failure: Option<StepFailure>,
}

impl CaseOutcome {
    /// Whether every step matched.
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

/// Result of running every case of one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResult {
    /// Question name.
    pub name:       String,
    /// Spec location, as loaded.
    pub path:       PathBuf,
    /// Outcomes in case order.
    pub cases:      Vec<CaseOutcome>,
    /// Number of passing cases.
    pub passed:     usize,
    /// Number of cases.
    pub total:      usize,
    /// `passed / total`.
    pub grade:      f64,
    /// Nominal points declared by the spec.
    pub points:     Option<f64>,
    /// Output captured while the candidate's environment was built.
    pub transcript: String,
}

impl QuestionResult {
    /// Fraction of cases that passed.
    pub fn grade(&self) -> f64 {
        self.grade
    }

    /// Whether every case passed.
    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }

    /// The first failing case, if any.
    pub fn first_failure(&self) -> Option<&CaseOutcome> {
        self.cases.iter().find(|c| !c.passed())
    }

    /// Attaches the setup transcript.
    pub fn with_transcript(mut self, transcript: impl Into<String>) -> Self {
        self.transcript = transcript.into();
        self
    }
}

/// Whitespace around rendered text is not significant.
fn normalize(text: &str) -> &str {
    text.trim()
}

/// Runs cases with a given evaluation strategy.
#[derive(Debug, Clone)]
pub struct CaseExecutor<E> {
    /// Strategy used for every statement.
    evaluator: E,
}

impl<E: Evaluator> CaseExecutor<E> {
    /// Creates an executor evaluating statements with `evaluator`.
    pub fn new(evaluator: E) -> Self {
        Self { evaluator }
    }

    /// Runs `case` against `env`, stopping at the first failing step.
    pub fn run(&self, case: &Case, index: usize, env: &mut Environment) -> CaseOutcome {
        let mut outcome = CaseOutcome {
            name: case.name().to_string(),
            index,
            hidden: case.hidden(),
            failure: None,
        };

        for (step_idx, step) in case.steps().iter().enumerate() {
            let (actual, fault) = match self.evaluator.evaluate(&step.statement, env) {
                Ok(value) => (value.render(), None),
                Err(fault) => {
                    tracing::warn!(case = case.name(), step = step_idx, %fault, "statement raised");
                    (fault.message.clone(), Some(fault.message))
                }
            };

            let matched = fault.is_none() && normalize(&actual) == normalize(&step.expected);
            tracing::debug!(case = case.name(), step = step_idx, matched, "evaluated step");

            if !matched {
                outcome.failure = Some(StepFailure {
                    step: step_idx,
                    line: step.line,
                    statement: step.statement.clone(),
                    expected: normalize(&step.expected).to_string(),
                    actual: normalize(&actual).to_string(),
                    fault,
                });
                break;
            }
        }

        outcome
    }

    /// Runs every case of `spec` against `env`.
    ///
    /// Cases share `env` in order; a failing or faulting case never stops
    /// later ones.
    pub fn run_all(&self, spec: &TestSpec, env: &mut Environment) -> QuestionResult {
        let cases: Vec<CaseOutcome> = spec
            .cases()
            .iter()
            .enumerate()
            .map(|(idx, case)| self.run(case, idx, env))
            .collect();

        let total = cases.len();
        let passed = cases.iter().filter(|c| c.passed()).count();
        let grade = if total == 0 { 0.0 } else { passed as f64 / total as f64 };

        tracing::info!(question = spec.name(), passed, total, "checked question");

        QuestionResult {
            name: spec.name().to_string(),
            path: spec.path().to_path_buf(),
            cases,
            passed,
            total,
            grade,
            points: spec.points(),
            transcript: String::new(),
        }
    }
}
