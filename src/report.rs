#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Renders the textual report.
//!
//! Consumers diff this text byte for byte, so every literal below, including
//! trailing spaces, is load-bearing.

use std::{fmt::Write, path::Path};

use itertools::Itertools;

use crate::{
    executor::{CaseOutcome, QuestionResult},
    summary::Summary,
};

/// Separator printed before the failing example, as doctest does.
const DIVIDER: &str = "**********************************************************************";

/// Shown in place of a trace when nothing failed.
const ALL_PASSED: &str = "All tests passed!";

/// Indents every line of `text` by four spaces.
fn indent(text: &str) -> String {
    text.lines().map(|l| format!("    {l}")).join("\n")
}

/// Writes `label:` and the indented block, or `label nothing` for empty text.
fn block(out: &mut String, label: &str, text: &str) {
    if text.is_empty() {
        let _ = writeln!(out, "{label} nothing");
    } else {
        let _ = writeln!(out, "{label}:\n{}", indent(text));
    }
}

/// Writes the transcript followed by a blank line, if there is one.
fn push_transcript(out: &mut String, transcript: &str) {
    let transcript = transcript.trim_end();
    if !transcript.is_empty() {
        out.push_str(transcript);
        out.push_str("\n\n");
    }
}

/// Renders the failure trace of one case, without a trailing newline.
pub fn case_trace(path: &Path, outcome: &CaseOutcome) -> String {
    let Some(failure) = &outcome.failure else {
        return String::new();
    };
    if outcome.hidden {
        return format!("Hidden test failed: {}", outcome.name);
    }

    let mut out = String::new();
    block(&mut out, "Trying", &failure.statement);
    block(&mut out, "Expecting", &failure.expected);
    let _ = writeln!(out, "{DIVIDER}");
    let _ = writeln!(out, "Line {}, in {} {}", failure.line, path.display(), outcome.index);
    block(&mut out, "Failed example", &failure.statement);
    block(&mut out, "Expected", &failure.expected);
    block(&mut out, "Got", &failure.actual);
    out.truncate(out.trim_end_matches('\n').len());
    out
}

/// Renders the report for a directory of questions.
pub fn format_summary(transcript: &str, summary: &Summary) -> String {
    let mut out = String::new();
    push_transcript(&mut out, transcript);

    let _ = writeln!(out, "{} of {} tests passed", summary.passed_total, summary.case_total);
    out.push('\n');
    out.push_str("Tests passed:\n");
    for name in &summary.passed {
        let _ = write!(out, " {name} ");
    }
    out.push_str("\n\n\n");
    out.push_str("Tests failed: \n");
    for failed in &summary.failed {
        let _ = writeln!(out, "   {}", failed.path.display());
    }
    out.push('\n');

    match summary.failed.first() {
        Some(first) => {
            out.push_str("Test result:\n");
            out.push_str(&case_trace(&first.path, &first.first_failure));
        }
        None => out.push_str(ALL_PASSED),
    }
    out
}

/// Renders the report for a single question: no banner, every failing case.
pub fn format_question(transcript: &str, result: &QuestionResult) -> String {
    let mut out = String::new();
    push_transcript(&mut out, transcript);

    if result.all_passed() {
        out.push_str(ALL_PASSED);
        return out;
    }

    out.push_str("Test result:\n");
    let traces = result
        .cases
        .iter()
        .filter(|c| !c.passed())
        .map(|c| case_trace(&result.path, c))
        .join("\n");
    out.push_str(&traces);
    out
}
