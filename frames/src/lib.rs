//! Shared frame model and chat record types for the realtime relay.
//!
//! This crate owns the wire representation used by both `server` and `cli`.
//! Frames travel as JSON text over the websocket; payloads stay flexible
//! (`serde_json::Value`) so the relay never has to understand what it echoes,
//! whether that is an object, an array, or a bare string.

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

// =============================================================================
// SYSCALLS
// =============================================================================

/// Client → relay: publish a payload to every connected client.
pub const CHAT_SEND: &str = "chat:send";

/// Relay → all clients: a payload published by some client (sender included).
pub const CHAT_RECEIVE: &str = "chat:receive";

/// Relay → client: sent once after the upgrade, carries `client_id`.
pub const SESSION_CONNECTED: &str = "session:connected";

/// Relay → client: the inbound text could not be parsed as a frame.
pub const GATEWAY_ERROR: &str = "gateway:error";

/// Frame data key for error messages.
pub const FRAME_MESSAGE: &str = "message";

/// Frame data key for grepable error codes.
pub const FRAME_CODE: &str = "code";

// =============================================================================
// ERRORS
// =============================================================================

/// Error returned by [`decode_frame`] and [`ChatMessage::from_data`].
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The text is not a valid JSON frame.
    #[error("failed to decode frame: {0}")]
    Decode(#[from] serde_json::Error),
    /// The frame payload is not shaped like a chat message.
    #[error("frame payload is not a chat message: {0}")]
    NotChatMessage(String),
}

// =============================================================================
// FRAME
// =============================================================================

/// Object payload used when building frames. Alias to reduce noise in signatures.
pub type Data = serde_json::Map<String, Value>;

/// Lifecycle status of a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Initial frame sent by a client, or an unsolicited relay event.
    Request,
    /// Successful terminal response.
    Done,
    /// Error terminal response.
    Error,
}

/// A single message on the relay wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Unique identifier for this frame.
    pub id: Uuid,
    /// ID of the frame this one responds to, if any.
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    /// Milliseconds since the Unix epoch when the frame was created.
    #[serde(default)]
    pub ts: i64,
    /// Sender identifier (relay client ID or a system label).
    #[serde(default)]
    pub from: Option<String>,
    /// Namespaced event name, e.g. `"chat:send"`.
    pub syscall: String,
    /// Lifecycle position of the frame.
    #[serde(default = "default_status")]
    pub status: Status,
    /// Arbitrary JSON payload. Relay events echo it untouched, so it may be
    /// an object, array, string, number, or null.
    #[serde(default)]
    pub data: Value,
}

fn default_status() -> Status {
    Status::Request
}

/// Current time as milliseconds since Unix epoch.
fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

impl Frame {
    /// Create a request frame.
    pub fn request(syscall: impl Into<String>, data: impl Into<Value>) -> Self {
        Self {
            id: Uuid::new_v4(),
            parent_id: None,
            ts: now_ms(),
            from: None,
            syscall: syscall.into(),
            status: Status::Request,
            data: data.into(),
        }
    }

    /// Create an error response from a plain string. Terminal.
    #[must_use]
    pub fn error(&self, message: impl Into<String>) -> Self {
        let mut data = Data::new();
        data.insert(FRAME_MESSAGE.into(), Value::String(message.into()));
        self.reply(Status::Error, Value::Object(data))
    }

    /// Build a reply frame. Inherits `syscall` and points `parent_id` at `self`.
    fn reply(&self, status: Status, data: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            parent_id: Some(self.id),
            ts: now_ms(),
            from: None,
            syscall: self.syscall.clone(),
            status,
            data,
        }
    }

    #[must_use]
    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Set one key on an object payload. A non-object payload is replaced.
    #[must_use]
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        if !self.data.is_object() {
            self.data = Value::Object(Data::new());
        }
        if let Value::Object(map) = &mut self.data {
            map.insert(key.into(), value.into());
        }
        self
    }

    /// Error message carried by an error frame, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.data.get(FRAME_MESSAGE).and_then(Value::as_str)
    }
}

/// Encode a frame as JSON text.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] if a payload value cannot be serialized
/// (only possible for non-finite floats smuggled into `data`).
pub fn encode_frame(frame: &Frame) -> Result<String, CodecError> {
    Ok(serde_json::to_string(frame)?)
}

/// Decode JSON text into a frame.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] for malformed JSON or a missing `id`/`syscall`.
pub fn decode_frame(text: &str) -> Result<Frame, CodecError> {
    Ok(serde_json::from_str(text)?)
}

// =============================================================================
// CHAT MESSAGE
// =============================================================================

/// One community chat message as stored and as published on the relay.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Server-assigned identity. `None` only for client-local fallback records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    /// Display label of the author (name, or email when the name is empty).
    pub author: String,
    /// Trimmed, non-empty message text.
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Flatten into a frame payload.
    #[must_use]
    pub fn to_data(&self) -> Data {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Data::new(),
        }
    }

    /// Parse a frame payload back into a chat message.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::NotChatMessage`] if required fields are missing
    /// or have the wrong type.
    pub fn from_data(data: &Value) -> Result<Self, CodecError> {
        Self::deserialize(data).map_err(|e| CodecError::NotChatMessage(e.to_string()))
    }
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
