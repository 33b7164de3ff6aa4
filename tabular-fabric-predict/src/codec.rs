//! Payload encodings used by the two entry points.
//!
//! Clients serialize the split table once more before sending it, so the HTTP
//! body may be either the table object or a JSON string holding it. Event
//! bodies always carry the table doubly encoded and are answered the same way.

use crate::errors::PredictError;
use crate::table::Table;
use serde_json::Value;

pub fn decode_http_payload(body: &[u8]) -> Result<Table, PredictError> {
    match serde_json::from_slice::<Value>(body)? {
        Value::String(inner) => Table::from_split_json(&inner),
        value @ Value::Object(_) => Table::from_split_value(value),
        other => Err(PredictError::PayloadError {
            msg: format!("expected a split table, got {}", json_kind(&other)),
        }),
    }
}

/// Decodes `json.dumps(json.dumps(table))`.
pub fn decode_event_body(body: &str) -> Result<Table, PredictError> {
    match serde_json::from_str::<Value>(body)? {
        Value::String(inner) => Table::from_split_json(&inner),
        other => Err(PredictError::PayloadError {
            msg: format!(
                "expected event body to hold an encoded table string, got {}",
                json_kind(&other)
            ),
        }),
    }
}

pub fn encode_event_body(table: &Table) -> Result<String, PredictError> {
    Ok(serde_json::to_string(&table.to_split_json()?)?)
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
