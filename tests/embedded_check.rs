use std::path::PathBuf;

use gradecheck::{
    Callable, CaseFault, CheckConfig, CheckError, Checker, Environment, Evaluator, Value,
};

fn tests_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join("check")
        .join("tests")
}

fn session() -> Environment {
    let mut env = Environment::new();
    env.bind_fn(Callable::new("square", 1, |args| match &args[0] {
        Value::Int(x) => Ok(Value::Int(x * x)),
        Value::Float(x) => Ok(Value::Float(x * x)),
        other => Err(CaseFault::new(format!("cannot square {}", other.type_name()))),
    }));
    env.bind_fn(Callable::new("negate", 1, |args| {
        args[0]
            .as_bool()
            .map(|b| Value::Bool(!b))
            .ok_or_else(|| CaseFault::new("negate expects a bool"))
    }));
    env
}

#[test]
fn grades_every_question_from_session_bindings() {
    let checker = Checker::new(tests_dir());
    let env = session();

    for question in ["q1", "q2", "q3", "q4", "q5"] {
        let result = checker.check(question, &env).expect("check");
        let expected = if question == "q2" { 0.0 } else { 1.0 };
        assert_eq!(result.grade(), expected, "grade for {question}");
    }
}

#[test]
fn caller_environment_is_left_untouched() {
    let checker = Checker::new(tests_dir());
    let env = session();
    let before = env.clone();

    let result = checker.check("q4", &env).expect("check");
    assert!(result.all_passed());
    assert!(!env.contains("y"));
    assert_eq!(env, before);
}

#[test]
fn missing_bindings_fail_without_erroring() {
    let checker = Checker::new(tests_dir());
    let result = checker.check("q1", &Environment::new()).expect("check");
    assert_eq!(result.grade(), 0.0);
    let failure = result.cases[0].failure.as_ref().expect("failure");
    assert!(failure.fault.is_some());
    assert_eq!(failure.expected, "9");
}

#[test]
fn unknown_question_is_an_error() {
    let checker = Checker::new(tests_dir());
    let err = checker.check("q42", &session()).unwrap_err();
    assert!(matches!(err, CheckError::UnknownQuestion { ref question, .. } if question == "q42"));
}

#[test]
fn check_all_follows_path_order() {
    let checker = Checker::new(tests_dir());
    let results = checker.check_all(&session()).expect("check all");
    let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["q1", "q2", "q3", "q4", "q5"]);
    let summary = gradecheck::aggregate(&results);
    assert_eq!(summary.passed, vec!["q1", "q3", "q4", "q5"]);
}

/// Evaluates statements of the form `name` or `name(int)` only.
struct Lookup;

impl Evaluator for Lookup {
    fn evaluate(&self, statement: &str, env: &mut Environment) -> Result<Value, CaseFault> {
        let (name, arg) = match statement.split_once('(') {
            Some((name, rest)) => (name, rest.trim_end_matches(')').trim()),
            None => (statement.trim(), ""),
        };
        match env.get(name) {
            Some(Value::Callable(f)) => {
                let arg: i64 = arg.parse().map_err(|_| CaseFault::new("not an int"))?;
                f.call(&[Value::Int(arg)])
            }
            Some(other) => Ok(other.clone()),
            None => Err(CaseFault::new(format!("{name} is not defined"))),
        }
    }
}

#[test]
fn custom_evaluators_plug_in() {
    let checker = Checker::with_evaluator(tests_dir(), Lookup, CheckConfig::default());
    let result = checker.check("q1", &session()).expect("check");
    assert_eq!(result.grade(), 1.0);
}
