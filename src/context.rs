//! The variable environment templates are rendered against.

use chrono::{DateTime, Datelike, Local};
use indexmap::IndexMap;
use serde::Serialize;

/// A single variable value.
///
/// Serialized untagged, so every value is printable as text inside a template.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
    /// Rendered as an RFC 3339 string.
    Timestamp(DateTime<Local>),
    /// Lists and maps coming from descriptor `vars`.
    Structured(serde_json::Value),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Null => Value::Text(String::new()),
            other => Value::Structured(other),
        }
    }
}

/// Name to value mapping for one generation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Context {
    vars: IndexMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, replacing any previous value with the same name.
    pub fn insert<K: Into<String>, V: Into<Value>>(&mut self, name: K, value: V) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Adds the builtin values: `now` and `year`.
    /// A variable that already uses one of those names is kept.
    pub fn with_builtins(mut self, now: DateTime<Local>) -> Self {
        self.vars.entry("year".to_string()).or_insert(Value::Number(now.year().into()));
        self.vars.entry("now".to_string()).or_insert(Value::Timestamp(now));
        self
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut context = Context::new();
        for (name, value) in iter {
            context.insert(name, value);
        }
        context
    }
}
