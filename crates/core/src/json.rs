//! Helpers for the loosely-shaped JSON payloads accepted by the write
//! endpoints.

use serde_json::{Map, Value};

use crate::error::CoreError;

/// Keys owned by the server. Payloads may not set them directly.
pub const RESERVED_KEYS: [&str; 2] = ["id", "isDeleted"];

/// Unwrap a request payload that must be a JSON object.
pub fn into_object(payload: Value, what: &str) -> Result<Map<String, Value>, CoreError> {
    match payload {
        Value::Object(map) => Ok(map),
        other => Err(CoreError::Validation(format!(
            "{what} must be a JSON object, got {}",
            type_name(&other)
        ))),
    }
}

/// Remove server-owned keys from a payload before it is merged into a record.
pub fn strip_reserved(mut map: Map<String, Value>) -> Map<String, Value> {
    for key in RESERVED_KEYS {
        map.remove(key);
    }
    map
}

/// Loose truthiness: `null`, `false`, `0`, `""` are falsy; arrays and
/// objects are always truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
