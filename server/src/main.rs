mod config;
mod db;
mod error;
mod llm;
mod rate_limit;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::llm::LlmChat;
use crate::llm::config::LlmConfig;
use crate::rate_limit::{RateLimitConfig, RateLimiter};
use crate::services::memory::MemoryStore;
use crate::services::store::{MessageStore, PgStore, UserStore};
use crate::services::token::TokenKeys;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("server=debug,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env();

    let (users, messages): (Arc<dyn UserStore>, Arc<dyn MessageStore>) = match &config.database_url {
        Some(url) => {
            let pool = db::init_pool(url, config.db_max_connections).await?;
            tracing::info!(max_connections = config.db_max_connections, "postgres store ready");
            let store = Arc::new(PgStore::new(pool));
            (store.clone(), store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store");
            let store = Arc::new(MemoryStore::new());
            (store.clone(), store)
        }
    };

    let tokens = match &config.jwt_secret {
        Some(secret) => TokenKeys::new(secret.clone(), config.jwt_expiry_secs),
        None => {
            tracing::warn!("JWT_SECRET not set; using a random signing key");
            TokenKeys::random(config.jwt_expiry_secs)
        }
    };

    let rate_limiter = RateLimiter::new(RateLimitConfig::from_env());
    let mut state = state::AppState::new(users, messages, tokens, config.bcrypt_cost, rate_limiter);

    // Chatbot is optional: a bad or missing LLM config disables it.
    match LlmConfig::from_env().and_then(|cfg| {
        let max_tokens = cfg.max_tokens;
        llm::LlmClient::from_config(cfg).map(|client| (client, max_tokens))
    }) {
        Ok((client, max_tokens)) => {
            tracing::info!(model = client.model(), "LLM client initialized");
            let client: Arc<dyn LlmChat> = Arc::new(client);
            state = state.with_llm(client, max_tokens);
        }
        Err(e) => {
            tracing::warn!(error = %e, "LLM client not configured; chatbot disabled");
        }
    }

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;

    tracing::info!(port = config.port, "huddle listening");
    axum::serve(listener, app).await?;
    Ok(())
}
