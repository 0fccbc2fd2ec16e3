#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # gradecheck
//!
//! Runs a candidate script and checks it against question specs.
//!
//! `gradecheck check solution.rhai --tests tests/` prints the summary report
//! for every spec in `tests/`; add `--question q1` to check one question, or
//! `--json` to print the results as JSON instead.

use std::path::PathBuf;

use anyhow::{Context, Result};
use bpaf::*;
use dotenvy::dotenv;
use gradecheck::{CheckConfig, RhaiEvaluator, check_script};
use tracing::metadata::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

/// Top-level CLI commands.
#[derive(Debug, Clone)]
enum Cmd {
    /// Check a candidate script
    Check {
        /// Spec file or directory of specs
        tests:    PathBuf,
        /// Single question to check within the directory
        question: Option<String>,
        /// Print JSON results instead of the report
        json:     bool,
        /// Candidate script
        script:   PathBuf,
    },
}

/// Parse the command line arguments and return a `Cmd` enum
fn options() -> Cmd {
    let tests = short('t')
        .long("tests")
        .help("Spec file, or directory of spec files")
        .argument::<PathBuf>("PATH");

    let question = short('q')
        .long("question")
        .help("Check only this question from the spec directory")
        .argument::<String>("NAME")
        .optional();

    let json = long("json")
        .help("Print machine-readable results instead of the report")
        .switch();

    let script = positional::<PathBuf>("SCRIPT").help("Candidate script to execute");

    construct!(Cmd::Check {
        tests,
        question,
        json,
        script
    })
    .to_options()
    .command("check")
    .help("Run a candidate script and check it against question specs")
    .to_options()
    .descr("Check candidate definitions against question specs")
    .run()
}

fn main() -> Result<()> {
    dotenv().ok();
    let config = CheckConfig::from_env();

    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr);
    let filter_layer = LevelFilter::from_level(config.log_level());
    tracing_subscriber::registry()
        .with(fmt)
        .with(filter_layer)
        .init();

    match options() {
        Cmd::Check {
            tests,
            question,
            json,
            script,
        } => {
            let evaluator = RhaiEvaluator::new().with_max_operations(config.max_operations());
            let report = check_script(&script, &tests, question.as_deref(), evaluator, &config)
                .with_context(|| {
                    format!("Failed to check `{}` against `{}`", script.display(), tests.display())
                })?;

            if json {
                println!("{}", report.to_json().context("Could not serialize results")?);
            } else {
                println!("{report}");
            }
        }
    }

    Ok(())
}
