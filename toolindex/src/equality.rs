//! Protocol-field equivalence between two tool definitions.
//!
//! All backends bound to one tool ID must describe the same tool. Only the
//! MCP-level fields take part in the comparison; the registry extensions
//! (`namespace`, `tags`) may legitimately differ between registrations.
//!
//! Schemas, metadata, annotations, and icons compare as JSON values, so a raw
//! byte schema equals a decoded one when both parse to the same document, and
//! `1` equals `1.0`.

use serde::Serialize;
use serde_json::{Map, Value};
use toolmodel::{Schema, Tool};

/// True when `a` and `b` agree on every protocol-level field.
pub fn protocol_fields_equal(a: &Tool, b: &Tool) -> bool {
    a.name == b.name
        && a.title == b.title
        && a.description == b.description
        && schema_equal(Some(&a.input_schema), Some(&b.input_schema))
        && schema_equal(a.output_schema.as_ref(), b.output_schema.as_ref())
        && serialized_equal(&a.annotations, &b.annotations)
        && icons_equal(a, b)
        && meta_equal(a.meta.as_ref(), b.meta.as_ref())
}

fn schema_equal(a: Option<&Schema>, b: Option<&Schema>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => match (a.to_value(), b.to_value()) {
            (Ok(a), Ok(b)) => json_equal(&a, &b),
            _ => false,
        },
        _ => false,
    }
}

fn icons_equal(a: &Tool, b: &Tool) -> bool {
    let a = a.icons.as_deref().unwrap_or_default();
    let b = b.icons.as_deref().unwrap_or_default();
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| serialized_equal(x, y))
}

fn meta_equal(a: Option<&Map<String, Value>>, b: Option<&Map<String, Value>>) -> bool {
    let empty = Map::new();
    let a = a.unwrap_or(&empty);
    let b = b.unwrap_or(&empty);
    a.len() == b.len()
        && a
            .iter()
            .all(|(k, va)| b.get(k).is_some_and(|vb| json_equal(va, vb)))
}

fn serialized_equal<T: Serialize>(a: &T, b: &T) -> bool {
    match (serde_json::to_value(a), serde_json::to_value(b)) {
        (Ok(a), Ok(b)) => json_equal(&a, &b),
        _ => false,
    }
}

/// Structural JSON equality.
///
/// Object key order is ignored. Numbers compare by value, so an integer equals
/// a float with the same magnitude.
pub fn json_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => {
            if x == y {
                return true;
            }
            match (x.as_f64(), y.as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            }
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| json_equal(a, b))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(k, va)| y.get(k).is_some_and(|vb| json_equal(va, vb)))
        }
        _ => false,
    }
}
