#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Folding question results into an overall summary.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::executor::{CaseOutcome, QuestionResult};

/// A question with at least one failing case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedQuestion {
    /// Question name.
    pub name:          String,
    /// Spec location.
    pub path:          PathBuf,
    /// Its first failing case.
    pub first_failure: CaseOutcome,
}

/// Totals and pass/fail listings across questions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Passing cases across all questions.
    pub passed_total: usize,
    /// Cases across all questions.
    pub case_total:   usize,
    /// Questions whose every case passed, in input order.
    pub passed:       Vec<String>,
    /// Questions with a failing case, in input order.
    pub failed:       Vec<FailedQuestion>,
}

impl Summary {
    /// Whether every case of every question passed.
    pub fn all_passed(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Builds the summary for `results`.
pub fn aggregate(results: &[QuestionResult]) -> Summary {
    results.iter().fold(Summary::default(), |mut summary, result| {
        summary.passed_total += result.passed;
        summary.case_total += result.total;
        match result.first_failure() {
            None => summary.passed.push(result.name.clone()),
            Some(outcome) => summary.failed.push(FailedQuestion {
                name:          result.name.clone(),
                path:          result.path.clone(),
                first_failure: outcome.clone(),
            }),
        }
        summary
    })
}
