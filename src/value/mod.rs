//! Structured values: property paths and the override merge
//!
//! Base configurations, override documents, effective configurations and
//! schema documents are all plain `serde_json::Value` trees (built with
//! `preserve_order`, so mapping keys keep their insertion order).

pub mod merge;
pub mod path;

pub use merge::{merge, merge_layers};
pub use path::{PropertyPath, Segment, delete, get, set};

use serde_json::Value;

/// Name of a value's runtime kind as used in messages and schema `type` checks
#[must_use]
#[inline]
pub const fn kind_name(value: &Value) -> &'static str {
    match *value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Whether a value is an object without any keys
#[must_use]
#[inline]
pub fn is_empty_object(value: &Value) -> bool {
    value.as_object().is_some_and(serde_json::Map::is_empty)
}
