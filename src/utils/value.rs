use serde_json::{Map, Value};

/// Flatten JSON call parameters into ordered key/value pairs for
/// query-string or form encoding.
///
/// Arrays become repeated keys, `null` becomes an empty value and nested
/// objects are sent as compact JSON.
pub fn params_to_pairs(params: &Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(params.len());
    for (key, value) in params {
        match value {
            Value::Array(items) => {
                for item in items {
                    pairs.push((key.clone(), value_to_string(item)));
                }
            }
            other => pairs.push((key.clone(), value_to_string(other))),
        }
    }
    pairs
}

/// Convert a scalar JSON value into its wire string.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
