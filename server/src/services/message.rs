//! Chat message service: validation and bounded history reads.

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use frames::ChatMessage;

use super::store::{MessageStore, NewMessage, StoreError};
use crate::error::ErrorCode;

/// Upper bound on a single history read.
pub const MAX_RECENT: usize = 50;

#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("Message cannot be empty")]
    Empty,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ErrorCode for MessageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Empty => "E_MESSAGE_EMPTY",
            Self::Store(e) => e.error_code(),
        }
    }

    fn http_status(&self) -> StatusCode {
        match self {
            Self::Empty => StatusCode::BAD_REQUEST,
            Self::Store(e) => e.http_status(),
        }
    }
}

/// Append a message under `author`. The text is stored trimmed; a missing
/// timestamp becomes now.
///
/// # Errors
///
/// Returns [`MessageError::Empty`] for blank text, or the store failure.
pub async fn post(
    store: &dyn MessageStore,
    author: &str,
    text: &str,
    timestamp: Option<DateTime<Utc>>,
) -> Result<ChatMessage, MessageError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(MessageError::Empty);
    }

    let message = store
        .append_message(NewMessage {
            author: author.to_owned(),
            text: text.to_owned(),
            timestamp: timestamp.unwrap_or_else(Utc::now),
        })
        .await?;
    tracing::debug!(id = ?message.id, %author, "message stored");
    Ok(message)
}

/// The most recent messages, oldest first. `limit` defaults to and is clamped
/// at [`MAX_RECENT`], and is never below one.
///
/// # Errors
///
/// Returns the store failure.
pub async fn recent(store: &dyn MessageStore, limit: Option<usize>) -> Result<Vec<ChatMessage>, MessageError> {
    let limit = limit.unwrap_or(MAX_RECENT).clamp(1, MAX_RECENT);
    Ok(store.recent_messages(limit).await?)
}

#[cfg(test)]
#[path = "message_test.rs"]
mod tests;
