//! In-process store used when no database is configured, and by tests.
//!
//! Contents are lost on restart.

use std::collections::HashMap;

use frames::ChatMessage;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::store::{MessageStore, NewMessage, NewUser, StoreError, UserRecord, UserStore};

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, UserRecord>>,
    messages: RwLock<Vec<ChatMessage>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let record = UserRecord {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            phone: user.phone,
            password_hash: user.password_hash,
        };
        users.insert(record.email.clone(), record.clone());
        Ok(record)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.read().await.get(email).cloned())
    }
}

#[async_trait::async_trait]
impl MessageStore for MemoryStore {
    async fn append_message(&self, message: NewMessage) -> Result<ChatMessage, StoreError> {
        let stored = ChatMessage {
            id: Some(Uuid::new_v4()),
            author: message.author,
            text: message.text,
            timestamp: message.timestamp,
        };
        self.messages.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn recent_messages(&self, limit: usize) -> Result<Vec<ChatMessage>, StoreError> {
        let messages = self.messages.read().await;
        let start = messages.len().saturating_sub(limit);
        Ok(messages[start..].to_vec())
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;
