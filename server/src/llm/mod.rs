//! LLM provider adapter behind the chatbot endpoint.
//!
//! DESIGN
//! ======
//! Configured from environment variables. The `LlmClient` dispatches to
//! `OpenAI` chat completions or a local Ollama server based on
//! `LLM_PROVIDER`. Callers depend on the [`LlmChat`] trait so tests can
//! substitute a mock.

pub mod config;
pub mod ollama;
pub mod openai;
pub mod types;

use config::{LlmConfig, LlmProviderKind};
pub use types::LlmChat;
use types::{ChatResponse, LlmError, Message};

// =============================================================================
// CLIENT DISPATCH
// =============================================================================

/// Concrete LLM client that dispatches to `OpenAI` or Ollama.
pub struct LlmClient {
    inner: LlmProvider,
    model: String,
}

enum LlmProvider {
    OpenAi(openai::OpenAiClient),
    Ollama(ollama::OllamaClient),
}

impl LlmClient {
    /// Build an LLM client from a parsed typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider HTTP client fails to build.
    pub fn from_config(config: LlmConfig) -> Result<Self, LlmError> {
        let inner = match config.provider {
            LlmProviderKind::OpenAi => {
                LlmProvider::OpenAi(openai::OpenAiClient::new(config.api_key, config.base_url, config.timeouts)?)
            }
            LlmProviderKind::Ollama => LlmProvider::Ollama(ollama::OllamaClient::new(config.base_url, config.timeouts)?),
        };
        Ok(Self { inner, model: config.model })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait::async_trait]
impl LlmChat for LlmClient {
    async fn chat(&self, max_tokens: u32, system: &str, messages: &[Message]) -> Result<ChatResponse, LlmError> {
        match &self.inner {
            LlmProvider::OpenAi(c) => c.chat(&self.model, max_tokens, system, messages).await,
            LlmProvider::Ollama(c) => c.chat(&self.model, max_tokens, system, messages).await,
        }
    }
}
