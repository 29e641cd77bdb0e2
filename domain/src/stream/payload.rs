//! Frame payloads.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The body of a frame after decoding.
///
/// A payload that fails to parse as JSON is kept as [`Payload::Raw`] rather
/// than dropped, so one corrupt frame never ends the stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Payload {
    /// Structured data parsed from the frame's data lines.
    Json(Value),
    /// Unparsable data, kept verbatim.
    Raw(String),
    /// The frame carried no data lines.
    Empty,
}

impl Payload {
    /// Build a payload from the joined data lines of a frame.
    pub fn from_data(data: &str) -> Self {
        if data.is_empty() {
            return Payload::Empty;
        }
        match serde_json::from_str::<Value>(data) {
            Ok(value) => Payload::Json(value),
            Err(_) => Payload::Raw(data.to_string()),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_raw(&self) -> Option<&str> {
        match self {
            Payload::Raw(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Payload::Raw(_))
    }

    /// Look up a string field on a JSON object payload.
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.as_json()?.get(field)?.as_str()
    }

    /// Decode a JSON payload into a typed view.
    ///
    /// Returns `None` for raw or empty payloads and for JSON that does not
    /// match the view's shape.
    pub fn decode<T: DeserializeOwned>(&self) -> Option<T> {
        let value = self.as_json()?;
        serde_json::from_value(value.clone()).ok()
    }
}
