//! Opaque connection cursors.
//!
//! A cursor is the base64 encoding of a JSON array whose leading string
//! elements identify the ordering (e.g. `"primary_key_asc"`) and whose final
//! element is the array of ordering values for one row:
//!
//! ```text
//! ["primary_key_asc", [42]]  ->  WyJwcmltYXJ5X2tleV9hc2MiLFs0Ml1d
//! ```

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;

use super::errors::QueryError;

/// JSON key under which each node carries its raw (unencoded) cursor
pub const NODE_CURSOR_KEY: &str = "__cursor";

#[derive(Debug, Clone, PartialEq)]
pub struct Cursor {
    pub prefix: Vec<String>,
    pub values: Vec<Value>,
}

impl Cursor {
    pub fn new(prefix: Vec<String>, values: Vec<Value>) -> Self {
        Self { prefix, values }
    }

    pub fn to_json(&self) -> Value {
        let mut items: Vec<Value> = self.prefix.iter().cloned().map(Value::String).collect();
        items.push(Value::Array(self.values.clone()));
        Value::Array(items)
    }

    pub fn encode(&self) -> String {
        encode_raw(&self.to_json())
    }

    pub fn from_json(raw: &Value) -> Result<Self, QueryError> {
        let Value::Array(items) = raw else {
            return Err(QueryError::InvalidCursor("expected a JSON array".to_string()));
        };
        let Some((Value::Array(values), prefix)) = items.split_last() else {
            return Err(QueryError::InvalidCursor(
                "last element must be the array of ordering values".to_string(),
            ));
        };
        let prefix = prefix
            .iter()
            .map(|item| match item {
                Value::String(tag) => Ok(tag.clone()),
                other => Err(QueryError::InvalidCursor(format!(
                    "ordering tag must be a string, found {}",
                    other
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            prefix,
            values: values.clone(),
        })
    }

    pub fn decode(encoded: &str) -> Result<Self, QueryError> {
        let bytes = STANDARD.decode(encoded.trim()).map_err(|e| {
            QueryError::invalid_cursor_with_context(e.to_string(), "base64 decoding")
        })?;
        let raw: Value = serde_json::from_slice(&bytes).map_err(|e| {
            QueryError::invalid_cursor_with_context(e.to_string(), "JSON decoding")
        })?;
        Self::from_json(&raw)
    }
}

/// Base64 of the compact JSON text of `raw`
pub fn encode_raw(raw: &Value) -> String {
    STANDARD.encode(raw.to_string())
}

/// Replace each node's raw `__cursor` with its encoded form and fill in
/// `startCursor` / `endCursor` from the first and last node.
///
/// Anything that is not a connection payload (an object with a `data` array)
/// is returned unchanged.
pub fn add_start_end_cursor(mut payload: Value) -> Value {
    let Some(object) = payload.as_object_mut() else {
        return payload;
    };
    let Some(Value::Array(nodes)) = object.get_mut("data") else {
        return payload;
    };

    let mut encoded = Vec::with_capacity(nodes.len());
    for node in nodes.iter_mut() {
        let cursor = node
            .as_object_mut()
            .and_then(|n| n.get_mut(NODE_CURSOR_KEY))
            .map(|raw| {
                let text = encode_raw(raw);
                *raw = Value::String(text.clone());
                Value::String(text)
            })
            .unwrap_or(Value::Null);
        encoded.push(cursor);
    }

    let start = encoded.first().cloned().unwrap_or(Value::Null);
    let end = encoded.last().cloned().unwrap_or(Value::Null);
    object.insert("startCursor".to_string(), start);
    object.insert("endCursor".to_string(), end);
    payload
}
