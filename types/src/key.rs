//! Prepare keys.
//!
//! A prepare key correlates the preparation of a component on the server with
//! the same logical instance on the client. It is the component id followed by
//! a canonical JSON rendering of the init values: object members are sorted
//! so key order never matters, while array order and values always do.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrepareKey(String);

impl PrepareKey {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrepareKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PrepareKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PrepareKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for PrepareKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Signature of a prepare-key derivation function.
pub type GetPrepareKey = fn(&str, &[Option<Value>]) -> PrepareKey;

/// Default key derivation: `component_id` + canonical JSON of `init_values`.
#[must_use]
pub fn derive_prepare_key(component_id: &str, init_values: &[Option<Value>]) -> PrepareKey {
    let canonical: Vec<Value> = init_values
        .iter()
        .map(|value| value.as_ref().map_or(Value::Null, canonicalize))
        .collect();
    PrepareKey(format!("{component_id}{}", Value::Array(canonical)))
}

/// Rebuild `value` with every object's members inserted in sorted key order.
#[must_use]
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            let sorted: Map<String, Value> = entries
                .into_iter()
                .map(|(key, value)| (key.clone(), canonicalize(value)))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => value.clone(),
    }
}
