//! Protocol envelopes.
//!
//! Every message in either direction is one JSON object `{event, data}`.
//! The server sends `status` with an object to merge into the state store,
//! or any other event name to update the single state key of that name.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ProtocolError;

/// Event name of a bulk state update.
pub const STATUS_EVENT: &str = "status";

/// One message unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Envelope {
    /// An envelope without data, e.g. `{"event":"get-status"}`.
    pub fn event(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            data: None,
        }
    }

    /// A UI command carrying data.
    pub fn command(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data: Some(data),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// What an inbound envelope asks the state store to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Write every entry of the object.
    Status(Map<String, Value>),
    /// Write one key.
    Update { key: String, value: Value },
}

impl Inbound {
    /// Decode an inbound text payload.
    ///
    /// A missing `data` on a single-key update writes `null`.
    pub fn parse(payload: &str) -> Result<Self, ProtocolError> {
        let envelope: Envelope = serde_json::from_str(payload).map_err(ProtocolError::Malformed)?;
        if envelope.event == STATUS_EVENT {
            match envelope.data {
                Some(Value::Object(map)) => Ok(Self::Status(map)),
                _ => Err(ProtocolError::StatusNotObject),
            }
        } else {
            Ok(Self::Update {
                key: envelope.event,
                value: envelope.data.unwrap_or(Value::Null),
            })
        }
    }
}
