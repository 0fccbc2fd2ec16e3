#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Entry points that tie loading, execution, capture and reporting together.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use serde::Serialize;

use crate::{
    capture::with_suppressed_output,
    config::CheckConfig,
    error::{CaptureError, CheckError},
    executor::{CaseExecutor, QuestionResult},
    report,
    scripting::{Evaluator, RhaiEvaluator},
    spec::{self, TestSpec},
    summary::{self, Summary},
    value::Environment,
};

/// Runs `spec` against a private copy of `env`, discarding anything the
/// candidate prints.
fn run_question<E: Evaluator>(
    executor: &CaseExecutor<E>,
    spec: &TestSpec,
    env: &Environment,
) -> Result<QuestionResult, CaptureError> {
    let mut env = env.clone();
    let (result, discarded) = with_suppressed_output(|| executor.run_all(spec, &mut env))?;
    if !discarded.is_empty() {
        tracing::debug!(question = spec.name(), bytes = discarded.len(), "discarded case output");
    }
    Ok(result)
}

/// Checks questions against environments supplied by the caller, e.g. the
/// bindings of an interactive session. Never prints.
pub struct Checker<E = RhaiEvaluator> {
    /// Directory holding one spec per question.
    tests_dir: PathBuf,
    /// Runs the cases.
    executor:  CaseExecutor<E>,
    /// Shared settings.
    config:    CheckConfig,
}

impl Checker<RhaiEvaluator> {
    /// A checker for the specs in `tests_dir`, using Rhai and configuration
    /// from the process environment.
    pub fn new(tests_dir: impl Into<PathBuf>) -> Self {
        let config = CheckConfig::from_env();
        let evaluator = RhaiEvaluator::new().with_max_operations(config.max_operations());
        Self::with_evaluator(tests_dir, evaluator, config)
    }
}

impl<E: Evaluator> Checker<E> {
    /// A checker using a custom evaluation strategy.
    pub fn with_evaluator(tests_dir: impl Into<PathBuf>, evaluator: E, config: CheckConfig) -> Self {
        Self {
            tests_dir: tests_dir.into(),
            executor: CaseExecutor::new(evaluator),
            config,
        }
    }

    /// Directory the checker reads specs from.
    pub fn tests_dir(&self) -> &Path {
        &self.tests_dir
    }

    /// Where the spec for `question` lives.
    pub fn spec_path(&self, question: &str) -> PathBuf {
        self.tests_dir
            .join(format!("{question}.{}", self.config.spec_extension()))
    }

    /// Checks one question against `env`.
    ///
    /// `env` itself is never modified.
    pub fn check(&self, question: &str, env: &Environment) -> Result<QuestionResult, CheckError> {
        let path = self.spec_path(question);
        if !path.is_file() {
            return Err(CheckError::UnknownQuestion {
                question: question.to_string(),
                dir:      self.tests_dir.clone(),
            });
        }
        let spec = TestSpec::load(&path)?;
        Ok(run_question(&self.executor, &spec, env)?)
    }

    /// Checks every question in the directory, in path order.
    pub fn check_all(&self, env: &Environment) -> Result<Vec<QuestionResult>, CheckError> {
        let specs = spec::load_dir(&self.tests_dir, self.config.spec_extension())?;
        specs
            .iter()
            .map(|spec| run_question(&self.executor, spec, env).map_err(CheckError::from))
            .collect()
    }
}

/// How the report was laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportMode {
    /// One question, traces only.
    Single,
    /// A directory of questions with the pass/fail banner.
    Summary,
}

/// Outcome of a batch check.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Layout used for `text`.
    mode:       ReportMode,
    /// Output of the candidate script.
    transcript: String,
    /// Overall `passed / total` across every case.
    grade:      f64,
    /// Per-question results.
    results:    Vec<QuestionResult>,
    /// Totals and listings.
    summary:    Summary,
    /// The rendered report.
    #[serde(skip)]
    text:       String,
}

impl Report {
    /// The rendered report.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Layout used for the text.
    pub fn mode(&self) -> ReportMode {
        self.mode
    }

    /// Output of the candidate script.
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// Per-question results.
    pub fn results(&self) -> &[QuestionResult] {
        &self.results
    }

    /// Totals and listings.
    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Overall `passed / total` across every case.
    pub fn grade(&self) -> f64 {
        self.grade
    }

    /// Machine-readable form of the results.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Executes the candidate script once and returns its environment and
/// transcript.
///
/// A fault raised by the script ends execution early; its message is
/// appended to the transcript and whatever was defined so far is kept.
pub fn build_environment<E: Evaluator>(
    script: &Path,
    evaluator: &E,
) -> Result<(Environment, String), CheckError> {
    let source = std::fs::read_to_string(script).map_err(|source| CheckError::Script {
        path: script.to_path_buf(),
        source,
    })?;

    let mut env = Environment::new();
    let (outcome, mut transcript) = with_suppressed_output(|| evaluator.execute(&source, &mut env))?;
    if let Err(fault) = outcome {
        tracing::warn!(script = %script.display(), %fault, "candidate script raised");
        transcript.push_str(&fault.message);
        transcript.push('\n');
    }
    tracing::info!(script = %script.display(), bindings = env.len(), "built candidate environment");

    Ok((env, transcript))
}

/// Specs selected for a batch check, and whether they form a single-question
/// report.
fn select_specs(
    tests: &Path,
    question: Option<&str>,
    config: &CheckConfig,
) -> Result<(Vec<TestSpec>, ReportMode), CheckError> {
    match question {
        Some(question) => {
            let dir = if tests.is_dir() {
                tests
            } else {
                tests.parent().unwrap_or(Path::new("."))
            };
            let path = dir.join(format!("{question}.{}", config.spec_extension()));
            if !path.is_file() {
                return Err(CheckError::UnknownQuestion {
                    question: question.to_string(),
                    dir:      dir.to_path_buf(),
                });
            }
            Ok((vec![TestSpec::load(&path)?], ReportMode::Single))
        }
        None if tests.is_dir() => {
            Ok((spec::load_dir(tests, config.spec_extension())?, ReportMode::Summary))
        }
        None => Ok((vec![TestSpec::load(tests)?], ReportMode::Single)),
    }
}

/// Runs the candidate `script`, then checks it against the spec file or
/// directory at `tests` (narrowed to `question` when given).
pub fn check_script<E: Evaluator>(
    script: &Path,
    tests: &Path,
    question: Option<&str>,
    evaluator: E,
    config: &CheckConfig,
) -> Result<Report, CheckError> {
    let (env, transcript) = build_environment(script, &evaluator)?;
    let (specs, mode) = select_specs(tests, question, config)?;

    let executor = CaseExecutor::new(&evaluator);
    let results = specs
        .iter()
        .map(|spec| {
            run_question(&executor, spec, &env).map(|r| r.with_transcript(transcript.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let summary = summary::aggregate(&results);
    let text = match mode {
        ReportMode::Single => report::format_question(&transcript, &results[0]),
        ReportMode::Summary => report::format_summary(&transcript, &summary),
    };
    let grade = if summary.case_total == 0 {
        0.0
    } else {
        summary.passed_total as f64 / summary.case_total as f64
    };

    Ok(Report {
        mode,
        transcript,
        grade,
        results,
        summary,
        text,
    })
}
