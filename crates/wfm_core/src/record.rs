use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// One raw stored item in the typed-attribute wire encoding.
pub type Item = BTreeMap<String, TypedValue>;

/// A single stored value, wrapped with its wire type tag.
///
/// The external tag matches the store's JSON shape, so `{"S": "abc"}`,
/// `{"N": "42"}`, `{"M": {...}}` and friends deserialize directly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum TypedValue {
    #[serde(rename = "S")]
    String(String),
    #[serde(rename = "N")]
    Number(String),
    #[serde(rename = "BOOL")]
    Bool(bool),
    #[serde(rename = "NULL")]
    Null(bool),
    #[serde(rename = "M")]
    Map(BTreeMap<String, TypedValue>),
    #[serde(rename = "L")]
    List(Vec<TypedValue>),
    #[serde(rename = "SS")]
    StringSet(Vec<String>),
    #[serde(rename = "NS")]
    NumberSet(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecError {
    message: String,
}

impl CodecError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CodecError {}

/// Strips the type tag from one value, recursing through maps and lists.
pub fn deserialize_value(value: &TypedValue) -> Result<Value, CodecError> {
    match value {
        TypedValue::String(text) => Ok(Value::String(text.clone())),
        TypedValue::Number(text) => parse_number(text).map(Value::Number),
        TypedValue::Bool(flag) => Ok(Value::Bool(*flag)),
        TypedValue::Null(_) => Ok(Value::Null),
        TypedValue::Map(entries) => {
            let mut plain = Map::new();
            for (name, nested) in entries {
                plain.insert(name.clone(), deserialize_value(nested)?);
            }
            Ok(Value::Object(plain))
        }
        TypedValue::List(entries) => {
            let mut plain = Vec::with_capacity(entries.len());
            for nested in entries {
                plain.push(deserialize_value(nested)?);
            }
            Ok(Value::Array(plain))
        }
        TypedValue::StringSet(entries) => Ok(Value::Array(
            entries.iter().cloned().map(Value::String).collect(),
        )),
        TypedValue::NumberSet(entries) => {
            let mut plain = Vec::with_capacity(entries.len());
            for text in entries {
                plain.push(Value::Number(parse_number(text)?));
            }
            Ok(Value::Array(plain))
        }
    }
}

/// Converts one raw item into a plain attribute-to-value mapping.
pub fn deserialize_item(item: &Item) -> Result<Map<String, Value>, CodecError> {
    let mut plain = Map::new();
    for (name, value) in item {
        plain.insert(name.clone(), deserialize_value(value)?);
    }
    Ok(plain)
}

/// Re-wraps a plain value with its type tag, recursively.
pub fn serialize_value(value: &Value) -> TypedValue {
    match value {
        Value::Null => TypedValue::Null(true),
        Value::Bool(flag) => TypedValue::Bool(*flag),
        Value::Number(number) => TypedValue::Number(number.to_string()),
        Value::String(text) => TypedValue::String(text.clone()),
        Value::Array(entries) => TypedValue::List(entries.iter().map(serialize_value).collect()),
        Value::Object(entries) => TypedValue::Map(
            entries
                .iter()
                .map(|(name, nested)| (name.clone(), serialize_value(nested)))
                .collect(),
        ),
    }
}

/// Decodes a raw item into a typed contract struct.
pub fn from_item<T: DeserializeOwned>(item: &Item) -> Result<T, CodecError> {
    let plain = deserialize_item(item)?;
    serde_json::from_value(Value::Object(plain))
        .map_err(|error| CodecError::new(format!("failed to decode stored item: {error}")))
}

/// Encodes a typed contract struct as a raw item for a full-record write.
pub fn to_item<T: Serialize>(record: &T) -> Result<Item, CodecError> {
    let value = serde_json::to_value(record)
        .map_err(|error| CodecError::new(format!("failed to encode record: {error}")))?;
    let Value::Object(entries) = value else {
        return Err(CodecError::new("record must encode to a top-level mapping"));
    };
    Ok(entries
        .iter()
        .map(|(name, nested)| (name.clone(), serialize_value(nested)))
        .collect())
}

fn parse_number(text: &str) -> Result<Number, CodecError> {
    if let Ok(integer) = text.parse::<i64>() {
        return Ok(Number::from(integer));
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .ok_or_else(|| CodecError::new(format!("invalid numeric attribute payload: {text:?}")))
}
