//! Property maps and their text encoding
//!
//! Free-form properties may nest arbitrarily. Graph stores only accept
//! primitives, so a property map crosses the store boundary as one canonical
//! JSON string: object keys sorted at every depth, no insignificant
//! whitespace. Equal maps always encode to identical text.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::errors::{Result, TopologyError};

/// Free-form entity / relationship properties
pub type PropertyMap = BTreeMap<String, Value>;

/// Reject maps the encoding boundary cannot carry faithfully
pub fn validate_properties(properties: &PropertyMap) -> Result<()> {
    if let Some(key) = properties.keys().find(|key| key.trim().is_empty()) {
        return Err(TopologyError::validation(format!(
            "property keys must be non-empty, got {:?}",
            key
        )));
    }
    Ok(())
}

/// Encode a property map to canonical JSON text
pub fn encode_properties(properties: &PropertyMap) -> Result<String> {
    validate_properties(properties)?;
    let canonical: Map<String, Value> = properties
        .iter()
        .map(|(key, value)| (key.clone(), canonicalize(value)))
        .collect();
    Ok(serde_json::to_string(&Value::Object(canonical))?)
}

/// Decode text produced by [`encode_properties`]
pub fn decode_properties(encoded: &str) -> Result<PropertyMap> {
    if encoded.trim().is_empty() {
        return Ok(PropertyMap::new());
    }
    match serde_json::from_str::<Value>(encoded)? {
        Value::Object(map) => Ok(map.into_iter().collect()),
        other => Err(TopologyError::serialization(format!(
            "encoded properties must be a JSON object, got {}",
            json_type(&other)
        ))),
    }
}

/// Encode a flat string map (labels, annotations, environment variables)
pub fn encode_string_map(map: &BTreeMap<String, String>) -> Result<String> {
    Ok(serde_json::to_string(map)?)
}

pub fn decode_string_map(encoded: &str) -> Result<BTreeMap<String, String>> {
    if encoded.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    Ok(serde_json::from_str(encoded)?)
}

/// Collect every primitive inside a value as text, depth first
pub fn collect_text(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Null => {}
        Value::Bool(b) => out.push(b.to_string()),
        Value::Number(n) => out.push(n.to_string()),
        Value::String(s) => out.push(s.clone()),
        Value::Array(items) => items.iter().for_each(|item| collect_text(item, out)),
        Value::Object(map) => map.values().for_each(|item| collect_text(item, out)),
    }
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.clone(), canonicalize(value)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
