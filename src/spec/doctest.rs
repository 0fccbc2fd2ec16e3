#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Splits doctest-style transcripts into steps.

use crate::spec::Step;

/// One classified line of a doctest transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocLine {
    /// `>>> statement`
    Prompt(String),
    /// `... continuation`
    Continuation(String),
    /// A line with only whitespace.
    Blank,
    /// Anything else: expected output.
    Output(String),
}

peg::parser! {
    /// Grammar for individual lines of a doctest transcript.
    pub grammar parser() for str {
        /// rest of the line, verbatim
        rule rest() -> String
            = r:$([_]*) { r.to_string() }

        /// matches the statement prompt
        rule prompt() = ">>>" (" " / ![_])

        /// matches the continuation prompt
        rule continuation() = "..." (" " / ![_])

        /// matches nothing but spaces and tabs
        rule blank()
            = [' ' | '\t' | '\r']* ![_]

        /// classifies a single dedented line
        pub rule line() -> DocLine
            = prompt() s:rest() { DocLine::Prompt(s) }
            / continuation() s:rest() { DocLine::Continuation(s) }
            / blank() { DocLine::Blank }
            / s:rest() { DocLine::Output(s) }
    }
}

/// Why a transcript could not be split into steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctestError {
    /// 1-based line of the problem.
    pub line:   usize,
    /// Description of the problem.
    pub reason: String,
}

/// Characters counted as indentation.
const INDENT: [char; 2] = [' ', '\t'];

/// Removes the space and tab indentation shared by all non-blank lines.
fn dedent(code: &str) -> Vec<&str> {
    let lines: Vec<&str> = code.lines().collect();
    let indent = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start_matches(INDENT).len())
        .min()
        .unwrap_or(0);

    lines
        .into_iter()
        .map(|l| if l.trim().is_empty() { "" } else { l.get(indent..).unwrap_or(l) })
        .collect()
}

/// Splits a transcript into steps, numbering lines from 1.
pub fn parse(code: &str) -> Result<Vec<Step>, DoctestError> {
    let mut steps = Vec::new();
    let mut current: Option<Step> = None;
    let mut in_output = false;

    for (idx, raw) in dedent(code).into_iter().enumerate() {
        let lineno = idx + 1;
        let classified = parser::line(raw).map_err(|e| DoctestError {
            line:   lineno,
            reason: e.to_string(),
        })?;

        match classified {
            DocLine::Prompt(statement) => {
                steps.extend(current.take());
                current = Some(Step {
                    statement,
                    expected: String::new(),
                    line: lineno,
                });
                in_output = false;
            }
            DocLine::Continuation(more) => match current.as_mut() {
                Some(step) if !in_output => {
                    step.statement.push('\n');
                    step.statement.push_str(&more);
                }
                _ => {
                    return Err(DoctestError {
                        line:   lineno,
                        reason: "continuation line without a preceding `>>>` prompt".into(),
                    });
                }
            },
            DocLine::Blank => {
                steps.extend(current.take());
                in_output = false;
            }
            DocLine::Output(text) => {
                if let Some(step) = current.as_mut() {
                    if in_output {
                        step.expected.push('\n');
                    }
                    step.expected.push_str(&text);
                    in_output = true;
                }
            }
        }
    }
    steps.extend(current);

    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_whitespace_is_not_indentation() {
        let steps = parse("  >>> 1\n  \u{3000}1\n").unwrap();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].statement, "1");
        assert_eq!(steps[0].expected, "\u{3000}1");

        // Shared indent is zero here, so the prompt is indented output.
        assert_eq!(parse("  >>> 1\n\u{3000}1\n"), Ok(vec![]));
    }

    #[test]
    fn classifies_lines() {
        assert_eq!(parser::line(">>> 1 + 1"), Ok(DocLine::Prompt("1 + 1".into())));
        assert_eq!(parser::line(">>>"), Ok(DocLine::Prompt(String::new())));
        assert_eq!(parser::line("...     x"), Ok(DocLine::Continuation("    x".into())));
        assert_eq!(parser::line("   "), Ok(DocLine::Blank));
        assert_eq!(parser::line("[1, 2]"), Ok(DocLine::Output("[1, 2]".into())));
        assert_eq!(parser::line(">>>x"), Ok(DocLine::Output(">>>x".into())));
    }

    #[test]
    fn splits_indented_transcript() {
        let code = "\n          >>> 1 == 1\n          False\n          ";
        let steps = parse(code).unwrap();
        assert_eq!(steps, vec![Step {
            statement: "1 == 1".into(),
            expected:  "False".into(),
            line:      2,
        }]);
    }

    #[test]
    fn joins_continuations_and_multiline_output() {
        let code = ">>> let x = 3;\n>>> if x > 2 {\n...     print(\"a\");\n... }\n>>> [x,\n... x]\n[3,\n 3]\n\n>>> x\n3\n";
        let steps = parse(code).unwrap();
        assert_eq!(steps.len(), 4);
        assert_eq!(steps[0].expected, "");
        assert_eq!(steps[1].statement, "if x > 2 {\n    print(\"a\");\n}");
        assert_eq!(steps[2].line, 5);
        assert_eq!(steps[2].expected, "[3,\n 3]");
        assert_eq!(steps[3].line, 10);
    }

    #[test]
    fn rejects_orphan_continuation() {
        let err = parse("... nope").unwrap_err();
        assert_eq!(err.line, 1);
    }

    #[test]
    fn output_without_prompt_is_ignored() {
        assert!(parse("just prose\n").unwrap().is_empty());
    }
}
