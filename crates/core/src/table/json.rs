//! Bridge between DynamoDB attribute values and JSON.
//!
//! Log payloads and CLI input/output are JSON; records are attribute maps.
//! Binary values are rendered as standard base64 strings and number sets as
//! arrays of numbers, so the conversion to JSON is lossy for type tags but
//! never fails.

use aws_sdk_dynamodb::types::AttributeValue;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Number, Value};
use thiserror::Error;

use super::types::Item;

/// Errors converting between JSON values and items.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Expected a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// Convert a single attribute value to JSON.
pub fn attribute_to_json(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => number_to_json(n),
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::B(blob) => Value::String(STANDARD.encode(blob.as_ref())),
        AttributeValue::L(list) => Value::Array(list.iter().map(attribute_to_json).collect()),
        AttributeValue::M(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), attribute_to_json(v)))
                .collect(),
        ),
        AttributeValue::Ss(set) => Value::Array(set.iter().cloned().map(Value::String).collect()),
        AttributeValue::Ns(set) => Value::Array(set.iter().map(|n| number_to_json(n)).collect()),
        AttributeValue::Bs(set) => Value::Array(
            set.iter()
                .map(|blob| Value::String(STANDARD.encode(blob.as_ref())))
                .collect(),
        ),
        _ => Value::Null,
    }
}

/// Convert an item to a JSON object.
pub fn item_to_json(item: &Item) -> Value {
    Value::Object(
        item.iter()
            .map(|(k, v)| (k.clone(), attribute_to_json(v)))
            .collect::<Map<String, Value>>(),
    )
}

/// Convert a JSON value to an attribute value.
///
/// Arrays become lists (never sets) and numbers keep their textual form.
pub fn json_to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(values) => AttributeValue::L(values.iter().map(json_to_attribute).collect()),
        Value::Object(map) => AttributeValue::M(
            map.iter()
                .map(|(k, v)| (k.clone(), json_to_attribute(v)))
                .collect(),
        ),
    }
}

/// Convert a JSON object to an item.
pub fn json_to_item(value: &Value) -> Result<Item, ConversionError> {
    match value {
        Value::Object(map) => Ok(map
            .iter()
            .map(|(k, v)| (k.clone(), json_to_attribute(v)))
            .collect()),
        other => Err(ConversionError::NotAnObject(json_kind(other))),
    }
}

/// Serialize a typed record into an item.
pub fn to_item<T: Serialize>(record: &T) -> Result<Item, ConversionError> {
    json_to_item(&serde_json::to_value(record)?)
}

/// Deserialize an item into a typed record.
pub fn from_item<T: DeserializeOwned>(item: &Item) -> Result<T, ConversionError> {
    Ok(serde_json::from_value(item_to_json(item))?)
}

fn number_to_json(n: &str) -> Value {
    if let Ok(i) = n.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(u) = n.parse::<u64>() {
        return Value::from(u);
    }
    n.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(n.to_string()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
