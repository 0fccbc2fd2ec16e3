use std::path::PathBuf;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};

fn fixture(rel: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(rel)
}

#[test]
fn failing_candidates_still_exit_zero() {
    let mut cmd = Command::cargo_bin("gradecheck").unwrap();
    cmd.arg("check")
        .arg("--tests")
        .arg(fixture("check/tests"))
        .arg(fixture("check/file0.rhai"));
    cmd.assert()
        .success()
        .stdout(contains("4 of 5 tests passed\n").and(contains("Got:\n    True\n")));
}

#[test]
fn single_question_flag() {
    let mut cmd = Command::cargo_bin("gradecheck").unwrap();
    cmd.arg("check")
        .arg("-t")
        .arg(fixture("check/tests"))
        .arg("-q")
        .arg("q3")
        .arg(fixture("check/file0.rhai"));
    cmd.assert()
        .success()
        .stdout("[0, 1, 2]\n\nAll tests passed!\n");
}

#[test]
fn json_output() {
    let mut cmd = Command::cargo_bin("gradecheck").unwrap();
    cmd.arg("check")
        .arg("--json")
        .arg("-t")
        .arg(fixture("arith"))
        .arg(fixture("arith/empty.rhai"));
    cmd.assert()
        .success()
        .stdout(contains("\"grade\": 0.5"));
}

#[test]
fn malformed_specs_fail_the_run() {
    let mut cmd = Command::cargo_bin("gradecheck").unwrap();
    cmd.arg("check")
        .arg("-t")
        .arg(fixture("bad"))
        .arg(fixture("check/file0.rhai"));
    cmd.assert().failure().stderr(contains("has no cases"));
}
