//! Field access over untyped JSON responses.
//!
//! Required fields that are absent or `null` become
//! [`SourceError::MissingField`]; primitives are read as their textual
//! content so numeric ids and string ids are handled alike.

use crate::error::SourceError;
use serde_json::{Map, Value};

pub(crate) type Object = Map<String, Value>;

/// Parses a response body into a JSON value.
pub(crate) fn parse_body(body: &[u8]) -> Result<Value, SourceError> {
    Ok(serde_json::from_slice(body)?)
}

/// Views a value as an object.
pub(crate) fn as_object<'a>(value: &'a Value, what: &str) -> Result<&'a Object, SourceError> {
    value.as_object().ok_or_else(|| SourceError::InvalidField {
        field: what.to_string(),
        expected: "object",
    })
}

fn present<'a>(obj: &'a Object, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

fn primitive_content(value: &Value, key: &str) -> Result<String, SourceError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(SourceError::InvalidField {
            field: key.to_string(),
            expected: "string or number",
        }),
    }
}

/// Reads a required primitive field as text.
pub(crate) fn required_str(obj: &Object, key: &str) -> Result<String, SourceError> {
    let value = present(obj, key).ok_or_else(|| SourceError::MissingField(key.to_string()))?;
    primitive_content(value, key)
}

/// Reads an optional primitive field as text.
pub(crate) fn optional_str(obj: &Object, key: &str) -> Result<Option<String>, SourceError> {
    present(obj, key)
        .map(|value| primitive_content(value, key))
        .transpose()
}

/// Reads a required array field.
pub(crate) fn required_array<'a>(obj: &'a Object, key: &str) -> Result<&'a [Value], SourceError> {
    optional_array(obj, key)?.ok_or_else(|| SourceError::MissingField(key.to_string()))
}

/// Reads an optional array field.
pub(crate) fn optional_array<'a>(
    obj: &'a Object,
    key: &str,
) -> Result<Option<&'a [Value]>, SourceError> {
    match present(obj, key) {
        None => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items.as_slice())),
        Some(_) => Err(SourceError::InvalidField {
            field: key.to_string(),
            expected: "array",
        }),
    }
}

/// Joins the `name` of every object in an optional array with `", "`.
pub(crate) fn join_names(obj: &Object, key: &str) -> Result<Option<String>, SourceError> {
    let Some(items) = optional_array(obj, key)? else {
        return Ok(None);
    };

    let names = items
        .iter()
        .map(|item| required_str(as_object(item, key)?, "name"))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(names.join(", ")))
}
