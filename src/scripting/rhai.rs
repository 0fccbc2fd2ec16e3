#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Evaluates statements with the Rhai scripting engine.
//!
//! Every evaluation gets a fresh [`Engine`]: callables bound in the
//! environment are registered as native functions, every other binding is
//! pushed into a [`Scope`]. After the statement runs, the scope is written
//! back into the environment and any functions the statement defined are
//! bound as callables.

use std::sync::Arc;

use rhai::{AST, Array, Dynamic, Engine, EvalAltResult, FnPtr, Scope};

use super::Evaluator;
use crate::{
    capture,
    error::CaseFault,
    value::{Callable, Environment, Opaque, Value},
};

/// Largest arity registered for a variadic callable.
const MAX_VARIADIC_ARITY: usize = 4;

/// Creates an engine whose `print` and `debug` output goes through the
/// capture sink.
pub fn create_engine() -> Engine {
    let mut engine = Engine::new();
    engine
        .on_print(capture::emit)
        .on_debug(|text, _source, _pos| capture::emit(text));
    engine
}

/// Statement evaluation backed by Rhai.
#[derive(Debug, Clone, Default)]
pub struct RhaiEvaluator {
    /// Upper bound on operations per evaluation, zero for unlimited.
    max_operations: u64,
}

impl RhaiEvaluator {
    /// An evaluator without an operation limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps the number of operations one evaluation may perform.
    pub fn with_max_operations(mut self, max_operations: u64) -> Self {
        self.max_operations = max_operations;
        self
    }

    /// Builds the engine for one evaluation against `env`.
    fn engine_for(&self, env: &Environment) -> Engine {
        engine_with(self.max_operations, env.callables())
    }
}

/// An engine capped at `max_operations` with `callables` registered.
fn engine_with<'a>(
    max_operations: u64,
    callables: impl IntoIterator<Item = &'a Callable>,
) -> Engine {
    let mut engine = create_engine();
    engine.set_max_operations(max_operations);
    for callable in callables {
        register_callable(&mut engine, callable);
    }
    engine
}

/// Script functions from one statement, with what they may call.
struct Library {
    /// Functions defined by the statement.
    ast:            AST,
    /// Callables bound when the functions were defined.
    callables:      Vec<Callable>,
    /// Operation cap for each call.
    max_operations: u64,
}

impl Evaluator for RhaiEvaluator {
    fn evaluate(&self, statement: &str, env: &mut Environment) -> Result<Value, CaseFault> {
        let engine = self.engine_for(env);
        let mut scope = scope_from(env);

        let ast = engine
            .compile_with_scope(&scope, statement)
            .map_err(|err| CaseFault::new(err.to_string()))?;
        let result = engine.eval_ast_with_scope::<Dynamic>(&mut scope, &ast);

        // Side effects before a fault stay visible to later steps.
        write_back(&scope, env);
        bind_functions(&ast, env, self.max_operations);

        result.map(from_dynamic).map_err(fault)
    }
}

/// Converts a Rhai error into a case fault.
fn fault(err: Box<EvalAltResult>) -> CaseFault {
    CaseFault::new(err.to_string())
}

/// Pushes every binding into a new scope; callables become function
/// pointers.
fn scope_from(env: &Environment) -> Scope<'static> {
    let mut scope = Scope::new();
    for (name, value) in env.iter() {
        scope.push_dynamic(name, into_dynamic(value.clone()));
    }
    scope
}

/// Copies scope variables back into the environment.
fn write_back(scope: &Scope, env: &mut Environment) {
    for (name, _constant, value) in scope.iter() {
        if value.is::<FnPtr>() && matches!(env.get(name), Some(Value::Callable(_))) {
            continue;
        }
        env.bind(name, from_dynamic(value));
    }
}

/// Binds the script functions defined in `ast` as callables.
///
/// They can call each other, and whatever was callable in `env` before.
fn bind_functions(ast: &AST, env: &mut Environment, max_operations: u64) {
    let functions: Vec<(String, usize)> = ast
        .iter_functions()
        .map(|f| (f.name.to_string(), f.params.len()))
        .collect();
    if functions.is_empty() {
        return;
    }

    let library = Arc::new(Library {
        ast: ast.clone_functions_only(),
        callables: env
            .callables()
            .filter(|c| !functions.iter().any(|(name, _)| name == c.name()))
            .cloned()
            .collect(),
        max_operations,
    });
    for (name, arity) in functions {
        tracing::debug!(function = %name, arity, "binding script function");
        env.bind_fn(script_callable(Arc::clone(&library), name, arity));
    }
}

/// Wraps a script function so it can be called from later statements.
fn script_callable(library: Arc<Library>, name: String, arity: usize) -> Callable {
    let fn_name = name.clone();
    Callable::new(name, arity, move |args| {
        let engine = engine_with(library.max_operations, &library.callables);
        let args: Vec<Dynamic> = args.iter().cloned().map(into_dynamic).collect();
        engine
            .call_fn::<Dynamic>(&mut Scope::new(), &library.ast, &fn_name, args)
            .map(from_dynamic)
            .map_err(fault)
    })
}

/// Registers `callable` as a native function on `engine`.
fn register_callable(engine: &mut Engine, callable: &Callable) {
    let arities = match callable.arity() {
        Some(arity) => arity..=arity,
        None => 0..=MAX_VARIADIC_ARITY,
    };
    let name = callable.name();

    for arity in arities {
        let f = callable.clone();
        match arity {
            0 => {
                engine.register_fn(name, move || invoke(&f, vec![]));
            }
            1 => {
                engine.register_fn(name, move |a: Dynamic| invoke(&f, vec![a]));
            }
            2 => {
                engine.register_fn(name, move |a: Dynamic, b: Dynamic| invoke(&f, vec![a, b]));
            }
            3 => {
                engine.register_fn(name, move |a: Dynamic, b: Dynamic, c: Dynamic| {
                    invoke(&f, vec![a, b, c])
                });
            }
            4 => {
                engine.register_fn(name, move |a: Dynamic, b: Dynamic, c: Dynamic, d: Dynamic| {
                    invoke(&f, vec![a, b, c, d])
                });
            }
            _ => {
                tracing::warn!(function = name, arity, "arity too large to register with Rhai");
            }
        }
    }
}

/// Calls a host function with Rhai arguments.
fn invoke(callable: &Callable, args: Vec<Dynamic>) -> Result<Dynamic, Box<EvalAltResult>> {
    let args: Vec<Value> = args.into_iter().map(from_dynamic).collect();
    callable
        .call(&args)
        .map(into_dynamic)
        .map_err(|fault| fault.message.into())
}

/// Converts an engine value into a [`Value`].
pub fn from_dynamic(value: Dynamic) -> Value {
    if value.is_unit() {
        return Value::None;
    }
    if let Ok(i) = value.as_int() {
        return Value::Int(i);
    }
    if let Ok(x) = value.as_float() {
        return Value::Float(x);
    }
    if let Ok(b) = value.as_bool() {
        return Value::Bool(b);
    }
    if let Ok(c) = value.as_char() {
        return Value::Text(c.to_string());
    }
    if value.is_string() {
        return value.into_string().map(Value::Text).unwrap_or_default();
    }
    if value.is_array() {
        return value
            .into_array()
            .map(|items| Value::List(items.into_iter().map(from_dynamic).collect()))
            .unwrap_or_default();
    }
    if let Some(opaque) = value.clone().try_cast::<Opaque>() {
        return Value::Opaque(opaque);
    }
    if let Some(ptr) = value.clone().try_cast::<FnPtr>() {
        return Value::Opaque(Opaque {
            type_name: "Fn".to_string(),
            display:   format!("<function {}>", ptr.fn_name()),
        });
    }

    Value::Opaque(Opaque {
        type_name: value.type_name().to_string(),
        display:   value.to_string(),
    })
}

/// Converts a [`Value`] into an engine value.
pub fn into_dynamic(value: Value) -> Dynamic {
    match value {
        Value::None => Dynamic::UNIT,
        Value::Int(i) => Dynamic::from_int(i),
        Value::Float(x) => Dynamic::from_float(x),
        Value::Bool(b) => Dynamic::from_bool(b),
        Value::Text(s) => s.into(),
        Value::List(items) => items
            .into_iter()
            .map(into_dynamic)
            .collect::<Array>()
            .into(),
        Value::Callable(c) => FnPtr::new(c.name())
            .map(Dynamic::from)
            .unwrap_or(Dynamic::UNIT),
        Value::Opaque(o) => Dynamic::from(o),
    }
}
