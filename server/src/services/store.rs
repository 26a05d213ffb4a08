//! Storage seams for users and chat messages.
//!
//! ARCHITECTURE
//! ============
//! Route handlers and services only see the [`UserStore`] and
//! [`MessageStore`] traits. [`PgStore`] backs them with Postgres when
//! `DATABASE_URL` is configured; `MemoryStore` (see `services::memory`)
//! backs them in-process otherwise and in tests.
//!
//! Messages are append-only. Arrival order is the insertion sequence, not the
//! client-supplied timestamp, so `recent` is stable even when clocks disagree.

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use frames::ChatMessage;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::ErrorCode;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateEmail => "E_DUPLICATE_EMAIL",
            Self::Database(_) => "E_DATABASE",
        }
    }

    fn http_status(&self) -> StatusCode {
        match self {
            Self::DuplicateEmail => StatusCode::BAD_REQUEST,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Fields required to create a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
}

/// Full user row, including the password hash. Never serialized.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
}

/// A validated message ready to be appended.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub author: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

// =============================================================================
// TRAITS
// =============================================================================

#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user. Fails with [`StoreError::DuplicateEmail`] if the email
    /// is taken.
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, StoreError>;

    /// Look up a user by normalized email.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;
}

#[async_trait::async_trait]
pub trait MessageStore: Send + Sync {
    /// Append a message and return the stored record with its assigned id.
    async fn append_message(&self, message: NewMessage) -> Result<ChatMessage, StoreError>;

    /// The `limit` most recently appended messages, oldest first.
    async fn recent_messages(&self, limit: usize) -> Result<Vec<ChatMessage>, StoreError>;
}

// =============================================================================
// POSTGRES
// =============================================================================

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const UNIQUE_VIOLATION: &str = "23505";

fn user_from_row(row: &sqlx::postgres::PgRow) -> UserRecord {
    UserRecord {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        password_hash: row.get("password_hash"),
    }
}

fn message_from_row(row: &sqlx::postgres::PgRow) -> ChatMessage {
    ChatMessage {
        id: Some(row.get("id")),
        author: row.get("author"),
        text: row.get("text"),
        timestamp: row.get("timestamp"),
    }
}

#[async_trait::async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let result = sqlx::query(
            r"INSERT INTO users (name, email, phone, password_hash)
              VALUES ($1, $2, $3, $4)
              RETURNING id, name, email, phone, password_hash",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(user_from_row(&row)),
            Err(sqlx::Error::Database(db)) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Err(StoreError::DuplicateEmail)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query("SELECT id, name, email, phone, password_hash FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(user_from_row))
    }
}

#[async_trait::async_trait]
impl MessageStore for PgStore {
    async fn append_message(&self, message: NewMessage) -> Result<ChatMessage, StoreError> {
        let row = sqlx::query(
            r"INSERT INTO messages (id, author, text, timestamp)
              VALUES ($1, $2, $3, $4)
              RETURNING id, author, text, timestamp",
        )
        .bind(Uuid::new_v4())
        .bind(&message.author)
        .bind(&message.text)
        .bind(message.timestamp)
        .fetch_one(&self.pool)
        .await?;
        Ok(message_from_row(&row))
    }

    async fn recent_messages(&self, limit: usize) -> Result<Vec<ChatMessage>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query(
            r"SELECT id, author, text, timestamp FROM (
                  SELECT id, author, text, timestamp, seq
                  FROM messages
                  ORDER BY seq DESC
                  LIMIT $1
              ) recent
              ORDER BY seq ASC",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(message_from_row).collect())
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
