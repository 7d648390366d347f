//! Read-only server variables

use std::collections::BTreeMap;

use gametest_domain::{GametestError, Result};
use serde_json::Value;

/// Named configuration values exposed to scripts as-is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerVariables {
    values: BTreeMap<String, Value>,
}

impl ServerVariables {
    pub fn new<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self { values: entries.into_iter().map(|(name, value)| (name.into(), value)).collect() }
    }

    /// Build from a parsed JSON object. Values may be any JSON type.
    ///
    /// # Errors
    /// Returns `GametestError::Config` if `json` is not an object.
    pub fn from_json(json: Value) -> Result<Self> {
        match json {
            Value::Object(map) => Ok(Self::new(map)),
            other => Err(GametestError::Config(format!(
                "variables must be a JSON object, found {}",
                json_type_name(&other)
            ))),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Convenience accessor for string-valued variables.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(Value::as_str)
    }

    /// Configured variable names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.values.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
