//! Local chat view: an ordered message list reconciled from three sources.
//!
//! DESIGN
//! ======
//! History seeds the list once. The client's own successful posts are
//! appended immediately. Relay deliveries (which include the client's own
//! posts echoed back) are appended only if not already present: same id, or
//! for id-less records the same (author, text, timestamp) triple.

use chrono::Utc;
use frames::ChatMessage;

use crate::CliError;

pub const SYSTEM_AUTHOR: &str = "System";
const OFFLINE_WELCOME: &str = "Welcome to the community chat! The message service is unavailable right now, so \
                               messages you send will only be shown here.";

/// What happened to a line the user tried to send.
#[derive(Debug, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input; nothing happened.
    Ignored,
    /// Stored by the server; publish it on the relay.
    Posted(ChatMessage),
    /// The session is no longer valid; the caller clears it.
    SessionExpired,
    /// Not stored and not broadcast; shown locally only.
    LocalOnly { message: ChatMessage, reason: String },
}

#[derive(Debug, Default)]
pub struct ChatView {
    messages: Vec<ChatMessage>,
}

impl ChatView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Seed from a history fetch. On failure the view holds a single system
    /// welcome message instead.
    pub fn load_history(&mut self, history: Result<Vec<ChatMessage>, CliError>) {
        self.messages = match history {
            Ok(history) => history,
            Err(_) => vec![ChatMessage {
                id: None,
                author: SYSTEM_AUTHOR.to_owned(),
                text: OFFLINE_WELCOME.to_owned(),
                timestamp: Utc::now(),
            }],
        };
    }

    /// Append a relay delivery unless it is already shown. Returns whether it
    /// was appended.
    pub fn receive(&mut self, message: ChatMessage) -> bool {
        if self.contains(&message) {
            return false;
        }
        self.messages.push(message);
        true
    }

    fn contains(&self, message: &ChatMessage) -> bool {
        self.messages.iter().any(|existing| same_message(existing, message))
    }

    /// Apply the result of posting `text` as `author`.
    pub fn apply_post(&mut self, author: &str, text: &str, result: Result<ChatMessage, CliError>) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SendOutcome::Ignored;
        }
        match result {
            Ok(stored) => {
                self.receive(stored.clone());
                SendOutcome::Posted(stored)
            }
            Err(e) if e.is_unauthorized() => SendOutcome::SessionExpired,
            Err(e) => {
                let message = ChatMessage {
                    id: None,
                    author: author.to_owned(),
                    text: text.to_owned(),
                    timestamp: Utc::now(),
                };
                self.messages.push(message.clone());
                SendOutcome::LocalOnly { message, reason: e.to_string() }
            }
        }
    }
}

fn same_message(a: &ChatMessage, b: &ChatMessage) -> bool {
    if let (Some(x), Some(y)) = (a.id, b.id) {
        if x == y {
            return true;
        }
    }
    a.author == b.author && a.text == b.text && a.timestamp == b.timestamp
}

#[cfg(test)]
#[path = "chat_view_test.rs"]
mod tests;
