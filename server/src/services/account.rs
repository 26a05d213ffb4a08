//! Account service: registration and password login.
//!
//! DESIGN
//! ======
//! Validation runs in a fixed order and stops at the first failure: presence,
//! email shape, phone shape, password length. Emails are stored trimmed and
//! lowercased and lookups normalize the same way. Bcrypt runs on the blocking
//! pool.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::store::{NewUser, StoreError, UserRecord, UserStore};
use crate::error::ErrorCode;

const MIN_PASSWORD_LEN: usize = 6;
const MAX_PHONE_DIGITS: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("{0}")]
    Validation(&'static str),
    #[error("User with this email already exists")]
    Duplicate,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => Self::Duplicate,
            other => Self::Store(other),
        }
    }
}

impl ErrorCode for AccountError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "E_VALIDATION",
            Self::Duplicate => "E_DUPLICATE_EMAIL",
            Self::InvalidCredentials => "E_INVALID_CREDENTIALS",
            Self::Hash(_) => "E_HASH",
            Self::Store(e) => e.error_code(),
        }
    }

    fn http_status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Duplicate => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Hash(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Store(e) => e.http_status(),
        }
    }
}

// =============================================================================
// TYPES
// =============================================================================

/// User projection returned to clients. Carries no credential material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl From<UserRecord> for PublicUser {
    fn from(record: UserRecord) -> Self {
        Self { id: record.id, name: record.name, email: record.email, phone: record.phone }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

// =============================================================================
// VALIDATION
// =============================================================================

#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// `local@domain.tld`: one `@`, no whitespace, and a dot inside the domain
/// with text on both sides.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Optional leading `+`, then up to 16 digits with no leading zero.
/// Spaces, dashes, and parentheses are ignored.
#[must_use]
pub fn is_valid_phone(phone: &str) -> bool {
    let cleaned: String = phone
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
        .collect();
    let digits = cleaned.strip_prefix('+').unwrap_or(&cleaned);
    let Some(first) = digits.chars().next() else {
        return false;
    };
    ('1'..='9').contains(&first)
        && digits.len() <= MAX_PHONE_DIGITS
        && digits.chars().all(|c| c.is_ascii_digit())
}

fn present(field: Option<&String>) -> Option<&str> {
    field.map(String::as_str).filter(|s| !s.trim().is_empty())
}

/// Passwords are taken verbatim, so whitespace counts toward the length.
fn present_password(field: Option<&String>) -> Option<&str> {
    field.map(String::as_str).filter(|s| !s.is_empty())
}

/// Registration fields after validation, before hashing.
#[derive(Debug)]
struct ValidRegistration {
    name: String,
    email: String,
    phone: String,
    password: String,
}

fn validate_registration(req: &RegisterRequest) -> Result<ValidRegistration, AccountError> {
    let (Some(name), Some(email), Some(phone), Some(password)) = (
        present(req.name.as_ref()),
        present(req.email.as_ref()),
        present(req.phone.as_ref()),
        present_password(req.password.as_ref()),
    ) else {
        return Err(AccountError::Validation("All fields are required"));
    };

    let email = normalize_email(email);
    if !is_valid_email(&email) {
        return Err(AccountError::Validation("Please enter a valid email address"));
    }
    if !is_valid_phone(phone) {
        return Err(AccountError::Validation("Please enter a valid phone number"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AccountError::Validation("Password must be at least 6 characters long"));
    }

    Ok(ValidRegistration {
        name: name.trim().to_owned(),
        email,
        phone: phone.trim().to_owned(),
        password: password.to_owned(),
    })
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// Validate and create an account.
///
/// # Errors
///
/// Returns [`AccountError::Validation`] for missing or malformed fields,
/// [`AccountError::Duplicate`] when the email is taken, and store or hashing
/// failures otherwise.
pub async fn register(
    users: &dyn UserStore,
    req: RegisterRequest,
    bcrypt_cost: u32,
) -> Result<PublicUser, AccountError> {
    let valid = validate_registration(&req)?;

    if users.find_user_by_email(&valid.email).await?.is_some() {
        return Err(AccountError::Duplicate);
    }

    let plain = valid.password;
    let password_hash = tokio::task::spawn_blocking(move || bcrypt::hash(plain, bcrypt_cost))
        .await
        .map_err(|e| AccountError::Hash(e.to_string()))?
        .map_err(|e| AccountError::Hash(e.to_string()))?;

    let record = users
        .create_user(NewUser { name: valid.name, email: valid.email, phone: valid.phone, password_hash })
        .await?;
    tracing::info!(user_id = %record.id, "account registered");
    Ok(record.into())
}

/// Check credentials and return the matching user.
///
/// # Errors
///
/// Returns [`AccountError::Validation`] if either field is missing and
/// [`AccountError::InvalidCredentials`] for an unknown email or wrong
/// password.
pub async fn login(users: &dyn UserStore, req: LoginRequest) -> Result<PublicUser, AccountError> {
    let (Some(email), Some(password)) = (present(req.email.as_ref()), present_password(req.password.as_ref()))
    else {
        return Err(AccountError::Validation("Email and password are required"));
    };

    let Some(record) = users.find_user_by_email(&normalize_email(email)).await? else {
        tracing::debug!("login for unknown email");
        return Err(AccountError::InvalidCredentials);
    };

    let plain = password.to_owned();
    let hash = record.password_hash.clone();
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(plain, &hash))
        .await
        .map_err(|e| AccountError::Hash(e.to_string()))?
        .unwrap_or(false);

    if !matches {
        tracing::debug!(user_id = %record.id, "login password mismatch");
        return Err(AccountError::InvalidCredentials);
    }

    Ok(record.into())
}

#[cfg(test)]
#[path = "account_test.rs"]
mod tests;
