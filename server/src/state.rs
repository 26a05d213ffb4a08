//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the user and message stores behind trait objects, the broadcast
//! relay, token keys, and the optional LLM client. Clone is cheap: every
//! field is `Arc`-wrapped or small.

use std::sync::Arc;

use crate::llm::LlmChat;
use crate::llm::config::DEFAULT_LLM_MAX_TOKENS;
use crate::rate_limit::RateLimiter;
use crate::services::relay::Relay;
use crate::services::store::{MessageStore, UserStore};
use crate::services::token::TokenKeys;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub messages: Arc<dyn MessageStore>,
    pub relay: Relay,
    pub tokens: TokenKeys,
    pub bcrypt_cost: u32,
    /// `None` if no LLM provider is configured; the chatbot answers 503.
    pub llm: Option<Arc<dyn LlmChat>>,
    pub llm_max_tokens: u32,
    /// Global limiter for chatbot calls.
    pub rate_limiter: RateLimiter,
}

impl AppState {
    #[must_use]
    pub fn new(
        users: Arc<dyn UserStore>,
        messages: Arc<dyn MessageStore>,
        tokens: TokenKeys,
        bcrypt_cost: u32,
        rate_limiter: RateLimiter,
    ) -> Self {
        Self {
            users,
            messages,
            relay: Relay::new(),
            tokens,
            bcrypt_cost,
            llm: None,
            llm_max_tokens: DEFAULT_LLM_MAX_TOKENS,
            rate_limiter,
        }
    }

    #[must_use]
    pub fn with_llm(mut self, llm: Arc<dyn LlmChat>, max_tokens: u32) -> Self {
        self.llm = Some(llm);
        self.llm_max_tokens = max_tokens;
        self
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
