use serde::Deserialize;
use serde_json::Value;

use crate::db::NewReading;
use crate::error::IngestError;

/// Body of `POST /tambah`, validated once at the boundary.
///
/// Each metric is either present with a number or absent (`null` and a
/// missing key both count as absent). Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReadingPayload {
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
}

impl ReadingPayload {
    pub fn from_slice(body: &[u8]) -> Result<Self, IngestError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|err| IngestError::MalformedPayload(format!("invalid JSON: {err}")))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, IngestError> {
        if !value.is_object() {
            return Err(IngestError::MalformedPayload(format!(
                "expected a JSON object, got {}",
                json_kind(&value)
            )));
        }

        serde_json::from_value(value)
            .map_err(|err| IngestError::MalformedPayload(err.to_string()))
    }

    pub fn into_new_reading(self) -> NewReading {
        NewReading::new(self.temperature, self.humidity)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
