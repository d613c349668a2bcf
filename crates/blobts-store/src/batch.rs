//! Untyped write input, as found in JSON-lines batch files.
//!
//! ```text
//! {"time": "2020-03-03 10:00", "data": [104, 105]}
//! {"time": 1583229600.5, "data": [0, 255]}
//! {"data": [1, 2, 3]}
//! ```

use blobts_time::from_json;
use blobts_types::TimeInput;
use serde_json::Value;

use crate::error::{BlobError, StoreError, StoreResult};

/// One record to be added.
#[derive(Clone, Debug, PartialEq)]
pub struct BatchEntry {
    pub time: TimeInput,
    pub data: Vec<u8>,
}

/// Accept a JSON array of byte values as a payload.
pub fn payload_from_json(value: &Value) -> Result<Vec<u8>, BlobError> {
    let wrong = |found: &str| BlobError::WrongType {
        expected: "an array of byte values",
        found: found.to_string(),
    };
    let items = match value {
        Value::Array(items) => items,
        Value::Null => return Err(wrong("null")),
        Value::Bool(_) => return Err(wrong("a boolean")),
        Value::Number(_) => return Err(wrong("a number")),
        Value::String(_) => return Err(wrong("a string")),
        Value::Object(_) => return Err(wrong("an object")),
    };
    items
        .iter()
        .map(|item| {
            item.as_u64()
                .and_then(|b| u8::try_from(b).ok())
                .ok_or_else(|| wrong(&format!("array element {item}")))
        })
        .collect()
}

/// Parse one line of a JSON-lines batch. A missing or null `time` means now.
pub fn parse_batch_line(line: &str) -> StoreResult<BatchEntry> {
    let value: Value =
        serde_json::from_str(line).map_err(|e| StoreError::Config(format!("bad batch line: {e}")))?;
    let Value::Object(fields) = &value else {
        return Err(BlobError::WrongType {
            expected: "an object with a \"data\" field",
            found: value.to_string(),
        }
        .into());
    };
    let time = from_json(fields.get("time").unwrap_or(&Value::Null))?;
    let data = payload_from_json(fields.get("data").unwrap_or(&Value::Null))?;
    Ok(BatchEntry { time, data })
}
