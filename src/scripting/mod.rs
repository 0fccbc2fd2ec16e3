//! Evaluation strategies.
//!
//! The check engine never interprets candidate code itself. It hands each
//! statement to an [`Evaluator`], which runs it against the shared
//! [`Environment`] and reports either a [`Value`] or a [`CaseFault`].

use crate::{
    error::CaseFault,
    value::{Environment, Value},
};

/// Rhai-backed evaluation strategy.
pub mod rhai;

pub use self::rhai::RhaiEvaluator;

/// Evaluates candidate statements against an environment.
pub trait Evaluator {
    /// Evaluates one statement, possibly mutating `env`.
    ///
    /// Statements that produce nothing renderable return [`Value::None`].
    fn evaluate(&self, statement: &str, env: &mut Environment) -> Result<Value, CaseFault>;

    /// Runs a whole candidate program so that its definitions land in `env`.
    fn execute(&self, program: &str, env: &mut Environment) -> Result<(), CaseFault> {
        self.evaluate(program, env).map(|_| ())
    }
}

impl<E: Evaluator + ?Sized> Evaluator for &E {
    fn evaluate(&self, statement: &str, env: &mut Environment) -> Result<Value, CaseFault> {
        (**self).evaluate(statement, env)
    }

    fn execute(&self, program: &str, env: &mut Environment) -> Result<(), CaseFault> {
        (**self).execute(program, env)
    }
}

impl<E: Evaluator + ?Sized> Evaluator for Box<E> {
    fn evaluate(&self, statement: &str, env: &mut Environment) -> Result<Value, CaseFault> {
        (**self).evaluate(statement, env)
    }

    fn execute(&self, program: &str, env: &mut Environment) -> Result<(), CaseFault> {
        (**self).execute(program, env)
    }
}
