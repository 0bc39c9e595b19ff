// ABOUTME: Minimal JSON-schema conformance check applied to every structured generation.
// ABOUTME: Supports type, properties, required, enum, and items, which is all the shapes use.

use serde_json::Value;

/// Check that `value` conforms to `schema`.
///
/// Returns a description of the first violation, prefixed with the JSON path
/// where it occurred. Unknown schema keywords are ignored.
pub fn conforms(schema: &Value, value: &Value) -> Result<(), String> {
    check(schema, value, "$")
}

fn check(schema: &Value, value: &Value, path: &str) -> Result<(), String> {
    if let Some(expected) = schema.get("type").and_then(|t| t.as_str())
        && !type_matches(expected, value)
    {
        return Err(format!(
            "{}: expected {}, got {}",
            path,
            expected,
            type_name(value)
        ));
    }

    if let Some(allowed) = schema.get("enum").and_then(|e| e.as_array())
        && !allowed.contains(value)
    {
        return Err(format!("{}: {} is not one of {}", path, value, Value::from(allowed.clone())));
    }

    if let Some(object) = value.as_object() {
        if let Some(required) = schema.get("required").and_then(|r| r.as_array()) {
            for key in required.iter().filter_map(|k| k.as_str()) {
                if !object.contains_key(key) {
                    return Err(format!("{}: missing required field '{}'", path, key));
                }
            }
        }

        if let Some(properties) = schema.get("properties").and_then(|p| p.as_object()) {
            for (key, sub_schema) in properties {
                match object.get(key) {
                    // Optional fields may be sent as explicit nulls.
                    Some(Value::Null) | None => {}
                    Some(sub_value) => check(sub_schema, sub_value, &format!("{}.{}", path, key))?,
                }
            }
        }
    }

    if let (Some(items), Some(array)) = (schema.get("items"), value.as_array()) {
        for (i, item) in array.iter().enumerate() {
            check(items, item, &format!("{}[{}]", path, i))?;
        }
    }

    Ok(())
}

fn type_matches(expected: &str, value: &Value) -> bool {
    match expected {
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
