//! Parsing steps for string-encoded tool parameters.
//!
//! Tools receive some structured values as strings (comma-separated
//! usernames, JSON objects). These helpers turn them into native values
//! and report failure as `KioskError` values the caller inspects before
//! making any outbound call.

use serde_json::{Map, Value};

use crate::error::KioskError;

/// Splits a comma-separated username list, trimming entries and dropping
/// empty ones.
///
/// # Errors
///
/// Returns `KioskError::NoUsernames` if nothing is left after filtering.
pub fn parse_usernames(raw: &str) -> Result<Vec<String>, KioskError> {
    let usernames: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if usernames.is_empty() {
        return Err(KioskError::NoUsernames);
    }
    Ok(usernames)
}

/// Parses a JSON string that must hold an object.
///
/// # Arguments
///
/// * `field` - Parameter name, used in the error message
/// * `raw` - The JSON text
///
/// # Errors
///
/// Returns `KioskError::InvalidJson` for malformed JSON or a non-object value.
pub fn parse_json_object(field: &'static str, raw: &str) -> Result<Map<String, Value>, KioskError> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(KioskError::invalid_json(
            field,
            format!("expected a JSON object, got {}", json_type_name(&other)),
        )),
        Err(e) => Err(KioskError::invalid_json(field, e)),
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
