//! # gradecheck
//!
//! A check engine for autograding: runs a candidate's definitions against
//! question specs made of statement/expected-output steps, and produces a
//! grade per question plus a deterministic textual report.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Scoped capture of candidate output
pub mod capture;
/// Batch and embedded check entry points
pub mod check;
/// Configuration read from the environment
pub mod config;
/// Error types
pub mod error;
/// Running cases against an environment
pub mod executor;
/// Rendering the textual report
pub mod report;
/// Evaluation strategies for candidate statements
pub mod scripting;
/// Loading test specs
pub mod spec;
/// Aggregating results across questions
pub mod summary;
/// Values and environments
pub mod value;

pub use check::{Checker, Report, ReportMode, check_script};
pub use config::CheckConfig;
pub use error::{CaptureError, CaseFault, CheckError, SpecError};
pub use executor::{CaseExecutor, CaseOutcome, QuestionResult, StepFailure};
pub use scripting::{Evaluator, RhaiEvaluator};
pub use spec::{Case, Step, TestSpec};
pub use summary::{Summary, aggregate};
pub use value::{Callable, Environment, Opaque, Value};
