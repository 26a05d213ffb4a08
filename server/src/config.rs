//! Server configuration parsed from environment variables.
//!
//! SYSTEM CONTEXT
//! ==============
//! `main` loads `.env` (if present) and then builds [`AppConfig`] once at
//! startup. Parsing goes through a lookup closure so tests can feed values
//! without touching the process environment.

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_JWT_EXPIRY_SECS: u64 = 7 * 24 * 60 * 60;
pub const DEFAULT_BCRYPT_COST: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    /// `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    /// `None` means a random per-process secret is generated at startup.
    pub jwt_secret: Option<String>,
    pub jwt_expiry_secs: u64,
    pub bcrypt_cost: u32,
}

impl AppConfig {
    /// Build config from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// - `PORT` (default 3000)
    /// - `DATABASE_URL` (unset → in-memory store)
    /// - `DB_MAX_CONNECTIONS` (default 5)
    /// - `JWT_SECRET` (unset → random per process)
    /// - `JWT_EXPIRY_SECS` (default 7 days)
    /// - `BCRYPT_COST` (default 10)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            port: parse_or(&lookup, "PORT", DEFAULT_PORT),
            database_url: non_empty(&lookup, "DATABASE_URL"),
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS),
            jwt_secret: non_empty(&lookup, "JWT_SECRET"),
            jwt_expiry_secs: parse_or(&lookup, "JWT_EXPIRY_SECS", DEFAULT_JWT_EXPIRY_SECS),
            bcrypt_cost: parse_or(&lookup, "BCRYPT_COST", DEFAULT_BCRYPT_COST),
        }
    }
}

/// Read `key` and parse it, falling back to `default` when unset or invalid.
pub(crate) fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

/// Read `key`, treating blank values as unset.
pub(crate) fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
