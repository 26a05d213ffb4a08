//! Bearer token issuance and verification (HS256 JWT).
//!
//! The token carries the user's identity claims, so request authentication
//! never needs a store lookup. Expiry and signature are the only checks.

use axum::http::StatusCode;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ErrorCode;
use crate::services::account::PublicUser;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("authentication token required")]
    Missing,
    #[error("invalid or expired token")]
    Invalid(#[from] jsonwebtoken::errors::Error),
    #[error("invalid user id in token")]
    BadSubject,
}

impl ErrorCode for TokenError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Missing => "E_TOKEN_MISSING",
            Self::Invalid(_) => "E_TOKEN_INVALID",
            Self::BadSubject => "E_TOKEN_SUBJECT",
        }
    }

    fn http_status(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }
}

/// JWT claims payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user UUID.
    pub sub: String,
    pub email: String,
    pub name: String,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
}

impl Claims {
    /// User id carried in `sub`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::BadSubject`] if `sub` is not a UUID.
    pub fn user_id(&self) -> Result<Uuid, TokenError> {
        self.sub.parse().map_err(|_| TokenError::BadSubject)
    }

    /// Display label used as a chat author: the name, or the email when the
    /// name is blank.
    #[must_use]
    pub fn author_label(&self) -> &str {
        if self.name.trim().is_empty() { &self.email } else { &self.name }
    }
}

/// Signing material shared by login and the auth extractor.
#[derive(Clone)]
pub struct TokenKeys {
    secret: String,
    expiry_secs: u64,
}

impl std::fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenKeys")
            .field("secret", &"<redacted>")
            .field("expiry_secs", &self.expiry_secs)
            .finish()
    }
}

impl TokenKeys {
    #[must_use]
    pub fn new(secret: impl Into<String>, expiry_secs: u64) -> Self {
        Self { secret: secret.into(), expiry_secs }
    }

    /// Keys with a random 32-byte secret. Tokens die with the process.
    #[must_use]
    pub fn random(expiry_secs: u64) -> Self {
        let bytes: [u8; 32] = rand::rng().random();
        let secret = bytes.iter().map(|b| format!("{b:02x}")).collect::<String>();
        Self::new(secret, expiry_secs)
    }

    /// Issue a signed token for `user`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Invalid`] if signing fails.
    pub fn issue(&self, user: &PublicUser) -> Result<String, TokenError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            name: user.name.clone(),
            iat: now,
            exp: now.saturating_add(i64::try_from(self.expiry_secs).unwrap_or(i64::MAX)),
        };
        Ok(encode(&Header::default(), &claims, &EncodingKey::from_secret(self.secret.as_bytes()))?)
    }

    /// Verify signature and expiry, returning the claims.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Invalid`] for bad signatures, malformed tokens,
    /// or expired tokens.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(data.claims)
    }
}

#[cfg(test)]
#[path = "token_test.rs"]
mod tests;
