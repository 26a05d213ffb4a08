//! Chatbot proxy: forwards one question to the configured LLM.

use axum::http::StatusCode;

use crate::error::ErrorCode;
use crate::llm::LlmChat;
use crate::llm::types::{LlmError, Message};
use crate::rate_limit::{RateLimitError, RateLimiter};

const SYSTEM_PROMPT: &str = "You are a helpful assistant for a community chat app. Answer concisely.";

#[derive(Debug, thiserror::Error)]
pub enum ChatbotError {
    #[error("Question is required")]
    EmptyQuestion,
    #[error("Chatbot is not configured")]
    NotConfigured,
    #[error(transparent)]
    RateLimited(#[from] RateLimitError),
    #[error(transparent)]
    Upstream(#[from] LlmError),
}

impl ErrorCode for ChatbotError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyQuestion => "E_QUESTION_EMPTY",
            Self::NotConfigured => "E_CHATBOT_UNAVAILABLE",
            Self::RateLimited(e) => e.error_code(),
            Self::Upstream(e) => e.error_code(),
        }
    }

    fn http_status(&self) -> StatusCode {
        match self {
            Self::EmptyQuestion => StatusCode::BAD_REQUEST,
            Self::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            Self::RateLimited(e) => e.http_status(),
            Self::Upstream(e) => e.http_status(),
        }
    }
}

/// Ask the configured LLM a single question.
///
/// # Errors
///
/// Returns [`ChatbotError::EmptyQuestion`] for blank input,
/// [`ChatbotError::NotConfigured`] without a provider, and rate-limit or
/// upstream failures otherwise.
pub async fn ask(
    llm: Option<&dyn LlmChat>,
    limiter: &RateLimiter,
    max_tokens: u32,
    question: &str,
) -> Result<String, ChatbotError> {
    let question = question.trim();
    if question.is_empty() {
        return Err(ChatbotError::EmptyQuestion);
    }
    let Some(llm) = llm else {
        return Err(ChatbotError::NotConfigured);
    };
    limiter.check_and_record()?;

    let response = llm.chat(max_tokens, SYSTEM_PROMPT, &[Message::user(question)]).await?;
    tracing::info!(
        model = %response.model,
        input_tokens = response.input_tokens,
        output_tokens = response.output_tokens,
        "chatbot answered"
    );
    Ok(response.text)
}

#[cfg(test)]
#[path = "chatbot_test.rs"]
mod tests;
