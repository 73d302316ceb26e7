//! Recursive schema evaluation
//!
//! Supported keywords, evaluated in this order at every schema node:
//! `type`, `enum`, `minimum`, `maximum`, `required`, `properties`,
//! `additionalProperties` and `items`. Anything else is ignored so newer
//! schema documents keep working.

use crate::error::{OverrideError, Result};
use crate::schema::Violation;
use crate::value::{PropertyPath, kind_name};
use serde_json::{Map, Value};

/// Kind names accepted by the `type` keyword
const KNOWN_KINDS: &[&str] = &[
    "null", "boolean", "number", "integer", "string", "array", "object",
];

/// Validate `value` against `schema`
///
/// Returns every violation found, in evaluation order. An empty list means
/// the value conforms.
///
/// # Errors
///
/// Returns a schema error if:
/// - The schema document is not a valid JSON Schema
/// - A supported keyword carries a value of the wrong shape
#[inline]
pub fn validate(value: &Value, schema: &Value) -> Result<Vec<Violation>> {
    // Compiling rejects documents that do not satisfy the JSON Schema meta-schema
    jsonschema::validator_for(schema)
        .map_err(|e| OverrideError::schema(format!("Invalid schema document: {e}")))?;

    let mut violations = Vec::new();
    evaluate(value, schema, &PropertyPath::root(), &mut violations)?;
    Ok(violations)
}

fn evaluate(
    value: &Value,
    schema: &Value,
    path: &PropertyPath,
    violations: &mut Vec<Violation>,
) -> Result<()> {
    let rules = match schema {
        Value::Bool(true) => return Ok(()),
        Value::Bool(false) => {
            violations.push(Violation::new(path.clone(), "no value is permitted here"));
            return Ok(());
        }
        Value::Object(rules) => rules,
        Value::Null | Value::Number(_) | Value::String(_) | Value::Array(_) => {
            return Err(malformed(
                path,
                "schema",
                &format!("must be an object or boolean, found {}", kind_name(schema)),
            ));
        }
    };

    if let Some(declared) = rules.get("type") {
        let kinds = type_names(declared, path)?;
        if !kinds.iter().any(|kind| matches_kind(value, kind)) {
            violations.push(Violation::new(
                path.clone(),
                format!("expected {}, found {}", kinds.join(" or "), kind_name(value)),
            ));
            return Ok(());
        }
    }

    if let Some(allowed) = rules.get("enum") {
        check_enum(value, allowed, path, violations)?;
    }

    check_bound(value, rules, Bound::Minimum, path, violations)?;
    check_bound(value, rules, Bound::Maximum, path, violations)?;

    match value {
        Value::Object(map) => check_object(map, rules, path, violations),
        Value::Array(items) => check_items(items, rules, path, violations),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => Ok(()),
    }
}

fn malformed(path: &PropertyPath, keyword: &str, problem: &str) -> OverrideError {
    let location = if path.is_root() {
        "the schema root".to_owned()
    } else {
        format!("'{path}'")
    };
    OverrideError::schema(format!("'{keyword}' at {location} {problem}"))
}

fn type_names<'s>(declared: &'s Value, path: &PropertyPath) -> Result<Vec<&'s str>> {
    let names = match declared {
        Value::String(name) => vec![name.as_str()],
        Value::Array(entries) => entries
            .iter()
            .map(|entry| {
                entry
                    .as_str()
                    .ok_or_else(|| malformed(path, "type", "must only list kind names"))
            })
            .collect::<Result<Vec<_>>>()?,
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::Object(_) => {
            return Err(malformed(path, "type", "must be a string or array of strings"));
        }
    };

    if let Some(unknown) = names.iter().find(|name| !KNOWN_KINDS.contains(*name)) {
        return Err(malformed(path, "type", &format!("names unknown kind '{unknown}'")));
    }

    Ok(names)
}

fn matches_kind(value: &Value, kind: &str) -> bool {
    match kind {
        "null" => value.is_null(),
        "boolean" => value.is_boolean(),
        "number" => value.is_number(),
        "integer" => {
            value.is_i64()
                || value.is_u64()
                || value.as_f64().is_some_and(|number| number.fract() == 0.0)
        }
        "string" => value.is_string(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        _ => false,
    }
}

fn check_enum(
    value: &Value,
    allowed: &Value,
    path: &PropertyPath,
    violations: &mut Vec<Violation>,
) -> Result<()> {
    let Value::Array(candidates) = allowed else {
        return Err(malformed(path, "enum", "must be an array"));
    };

    if !candidates.iter().any(|candidate| values_equal(value, candidate)) {
        let listed = candidates
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        violations.push(Violation::new(
            path.clone(),
            format!("{value} is not one of the allowed values: {listed}"),
        ));
    }

    Ok(())
}

/// Structural equality where numbers compare by value, so `10` equals `10.0`
fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => a == b,
        },
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a
                    .iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| values_equal(x, y)))
        }
        _ => left == right,
    }
}

#[derive(Clone, Copy)]
enum Bound {
    Minimum,
    Maximum,
}

fn check_bound(
    value: &Value,
    rules: &Map<String, Value>,
    bound: Bound,
    path: &PropertyPath,
    violations: &mut Vec<Violation>,
) -> Result<()> {
    let keyword = match bound {
        Bound::Minimum => "minimum",
        Bound::Maximum => "maximum",
    };
    let Some(limit) = rules.get(keyword) else {
        return Ok(());
    };
    let Some(limit_number) = limit.as_f64() else {
        return Err(malformed(path, keyword, "must be a number"));
    };
    let Some(actual) = value.as_f64() else {
        return Ok(());
    };

    match bound {
        Bound::Minimum if actual < limit_number => violations.push(Violation::new(
            path.clone(),
            format!("{value} is less than the minimum of {limit}"),
        )),
        Bound::Maximum if actual > limit_number => violations.push(Violation::new(
            path.clone(),
            format!("{value} is greater than the maximum of {limit}"),
        )),
        Bound::Minimum | Bound::Maximum => {}
    }

    Ok(())
}

fn check_object(
    map: &Map<String, Value>,
    rules: &Map<String, Value>,
    path: &PropertyPath,
    violations: &mut Vec<Violation>,
) -> Result<()> {
    if let Some(required) = rules.get("required") {
        let Value::Array(names) = required else {
            return Err(malformed(path, "required", "must be an array of strings"));
        };
        for name in names {
            let Some(name) = name.as_str() else {
                return Err(malformed(path, "required", "must be an array of strings"));
            };
            if !map.contains_key(name) {
                violations.push(Violation::new(
                    path.key(name),
                    format!("required property '{name}' is missing"),
                ));
            }
        }
    }

    let properties = match rules.get("properties") {
        None => None,
        Some(Value::Object(properties)) => Some(properties),
        Some(_) => return Err(malformed(path, "properties", "must be an object")),
    };

    if let Some(properties) = properties {
        for (name, property_schema) in properties {
            if let Some(child) = map.get(name) {
                evaluate(child, property_schema, &path.key(name), violations)?;
            }
        }
    }

    let Some(additional) = rules.get("additionalProperties") else {
        return Ok(());
    };
    if !matches!(additional, Value::Bool(_) | Value::Object(_)) {
        return Err(malformed(
            path,
            "additionalProperties",
            "must be a boolean or a schema object",
        ));
    }

    let declared = |name: &str| properties.is_some_and(|properties| properties.contains_key(name));
    for (name, child) in map {
        if declared(name) {
            continue;
        }
        if additional == &Value::Bool(false) {
            violations.push(Violation::new(
                path.key(name),
                format!("property '{name}' is not allowed by the schema"),
            ));
        } else {
            evaluate(child, additional, &path.key(name), violations)?;
        }
    }

    Ok(())
}

fn check_items(
    items: &[Value],
    rules: &Map<String, Value>,
    path: &PropertyPath,
    violations: &mut Vec<Violation>,
) -> Result<()> {
    match rules.get("items") {
        None => Ok(()),
        Some(item_schema @ (Value::Object(_) | Value::Bool(_))) => {
            for (index, item) in items.iter().enumerate() {
                evaluate(item, item_schema, &path.index(index), violations)?;
            }
            Ok(())
        }
        // Draft-07 positional form; elements past the list are unconstrained
        Some(Value::Array(positional)) => {
            for (index, (item, item_schema)) in items.iter().zip(positional).enumerate() {
                evaluate(item, item_schema, &path.index(index), violations)?;
            }
            Ok(())
        }
        Some(Value::Null | Value::Number(_) | Value::String(_)) => Err(malformed(
            path,
            "items",
            "must be a schema or an array of schemas",
        )),
    }
}
