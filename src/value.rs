#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Values bound in an [`Environment`] and their canonical display text.

use std::{collections::BTreeMap, fmt, sync::Arc};

use itertools::Itertools;

use crate::error::CaseFault;

/// Signature of a host function stored in a [`Callable`].
type HostFn = dyn Fn(&[Value]) -> Result<Value, CaseFault> + Send + Sync;

/// A named function that statements may call.
#[derive(Clone)]
pub struct Callable {
    /// Name the function is bound under.
    name:  String,
    /// Number of arguments, if fixed.
    arity: Option<usize>,
    /// The function body.
    func:  Arc<HostFn>,
}

impl Callable {
    /// Wraps `func` as a callable taking exactly `arity` arguments.
    pub fn new(
        name: impl Into<String>,
        arity: usize,
        func: impl Fn(&[Value]) -> Result<Value, CaseFault> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name:  name.into(),
            arity: Some(arity),
            func:  Arc::new(func),
        }
    }

    /// Wraps `func` as a callable accepting any number of arguments.
    pub fn variadic(
        name: impl Into<String>,
        func: impl Fn(&[Value]) -> Result<Value, CaseFault> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name:  name.into(),
            arity: None,
            func:  Arc::new(func),
        }
    }

    /// Name of the function.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fixed arity, if any.
    pub fn arity(&self) -> Option<usize> {
        self.arity
    }

    /// Invokes the function, checking arity first.
    pub fn call(&self, args: &[Value]) -> Result<Value, CaseFault> {
        if let Some(arity) = self.arity
            && arity != args.len()
        {
            return Err(CaseFault::new(format!(
                "{}() takes {} argument{} but {} were given",
                self.name,
                arity,
                if arity == 1 { "" } else { "s" },
                args.len()
            )));
        }
        (self.func)(args)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// A host value the engine cannot inspect, shown through its display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opaque {
    /// Type name reported by the evaluation strategy.
    pub type_name: String,
    /// Text shown when the value is rendered.
    pub display:   String,
}

/// The closed set of values an environment can hold.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// No renderable value, e.g. the result of a pure side effect.
    #[default]
    None,
    /// Integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// Text.
    Text(String),
    /// Ordered sequence.
    List(Vec<Value>),
    /// Host function.
    Callable(Callable),
    /// Anything else.
    Opaque(Opaque),
}

impl Value {
    /// Canonical display text, the same text an interactive session echoes.
    ///
    /// `None` renders as empty text at the top level.
    pub fn render(&self) -> String {
        match self {
            Value::None => String::new(),
            other => other.repr(),
        }
    }

    /// Representation used for nested values, where `None` is spelled out.
    fn repr(&self) -> String {
        match self {
            Value::None => "None".to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(x) => render_float(*x),
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            Value::Text(s) => quote(s),
            Value::List(items) => format!("[{}]", items.iter().map(Value::repr).join(", ")),
            Value::Callable(c) => format!("<function {}>", c.name()),
            Value::Opaque(o) => o.display.clone(),
        }
    }

    /// Name of the variant, used in fault messages.
    pub fn type_name(&self) -> &str {
        match self {
            Value::None => "None",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Text(_) => "str",
            Value::List(_) => "list",
            Value::Callable(_) => "function",
            Value::Opaque(o) => &o.type_name,
        }
    }

    /// Returns the integer, if this is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the number as a float, for both integers and floats.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// Returns the boolean, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// Floats always show a fractional part, like `9.0`; very large or small
/// magnitudes use exponent notation, like `1e+16`.
fn render_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf".to_string() } else { "-inf".to_string() };
    }
    if x != 0.0 && !(1e-4..1e16).contains(&x.abs()) {
        let sci = format!("{x:e}");
        let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
        let (sign, digits) = match exponent.strip_prefix('-') {
            Some(digits) => ('-', digits),
            None => ('+', exponent),
        };
        return format!("{mantissa}e{sign}{digits:0>2}");
    }
    if x.fract() == 0.0 { format!("{x:.1}") } else { x.to_string() }
}

/// Quotes text with single quotes unless it contains one and no double quote.
fn quote(s: &str) -> String {
    let delim = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(delim);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == delim => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(delim);
    out
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Callable(a), Value::Callable(b)) => Arc::ptr_eq(&a.func, &b.func),
            (Value::Opaque(a), Value::Opaque(b)) => a == b,
            _ => false,
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Callable> for Value {
    fn from(value: Callable) -> Self {
        Value::Callable(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}

/// Name to value bindings that statements are evaluated against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    /// Bindings, ordered by name so iteration is deterministic.
    bindings: BTreeMap<String, Value>,
}

impl Environment {
    /// An empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to `value`, returning the previous value.
    pub fn bind(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.bindings.insert(name.into(), value.into())
    }

    /// Binds a callable under its own name.
    pub fn bind_fn(&mut self, callable: Callable) -> Option<Value> {
        self.bindings
            .insert(callable.name().to_string(), Value::Callable(callable))
    }

    /// Looks up `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    /// Removes `name`, returning its value.
    pub fn unbind(&mut self, name: &str) -> Option<Value> {
        self.bindings.remove(name)
    }

    /// Whether `name` is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether there are no bindings.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// All bindings in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.bindings.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Bound callables in name order.
    pub fn callables(&self) -> impl Iterator<Item = &Callable> {
        self.bindings.values().filter_map(|v| match v {
            Value::Callable(c) => Some(c),
            _ => None,
        })
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            bindings: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Environment {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.bindings
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_like_an_interactive_echo() {
        assert_eq!(Value::None.render(), "");
        assert_eq!(Value::Bool(true).render(), "True");
        assert_eq!(Value::Int(-3).render(), "-3");
        assert_eq!(Value::Float(9.0).render(), "9.0");
        assert_eq!(Value::Float(0.25).render(), "0.25");
        assert_eq!(Value::Float(1e16).render(), "1e+16");
        assert_eq!(Value::Float(-2.5e20).render(), "-2.5e+20");
        assert_eq!(Value::Float(1.5e-5).render(), "1.5e-05");
        assert_eq!(Value::Float(1e15).render(), "1000000000000000.0");
        assert_eq!(Value::Float(0.0001).render(), "0.0001");
        assert_eq!(Value::from("it's").render(), "\"it's\"");
        assert_eq!(Value::from("a\nb").render(), "'a\\nb'");
        assert_eq!(
            Value::List(vec![Value::Int(1), Value::None, Value::from("x")]).render(),
            "[1, None, 'x']"
        );
    }

    #[test]
    fn callable_checks_arity() {
        let square = Callable::new("square", 1, |args| {
            let x = args[0].as_int().unwrap_or_default();
            Ok(Value::Int(x * x))
        });
        assert_eq!(square.call(&[Value::Int(3)]), Ok(Value::Int(9)));
        let err = square.call(&[]).unwrap_err();
        assert_eq!(err.message, "square() takes 1 argument but 0 were given");
        assert_eq!(Value::from(square).render(), "<function square>");
    }

    #[test]
    fn environment_clones_are_independent() {
        let mut env: Environment = [("x", 1_i64)].into_iter().collect();
        let mut copy = env.clone();
        copy.bind("x", 2_i64);
        copy.bind("y", true);
        assert_eq!(env.get("x"), Some(&Value::Int(1)));
        assert!(!env.contains("y"));
        env.unbind("x");
        assert!(env.is_empty());
        assert_eq!(copy.len(), 2);
    }
}
