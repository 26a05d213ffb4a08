//! LLM configuration parsed from environment variables.

use super::types::LlmError;
use crate::config::{non_empty, parse_or};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_LLM_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_LLM_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_LLM_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProviderKind {
    OpenAi,
    Ollama,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlmTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub provider: LlmProviderKind,
    /// Empty for Ollama, which takes no key.
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub max_tokens: u32,
    pub timeouts: LlmTimeouts,
}

impl LlmConfig {
    /// Build typed LLM config from the process environment.
    ///
    /// # Errors
    ///
    /// See [`LlmConfig::from_lookup`].
    pub fn from_env() -> Result<Self, LlmError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build typed LLM config from an arbitrary key lookup.
    ///
    /// - `LLM_PROVIDER`: `openai` (default) or `ollama`
    /// - `LLM_API_KEY_ENV`: names the env var holding the `OpenAI` key
    ///   (default `OPENAI_API_KEY`)
    /// - `LLM_MODEL`: provider default when absent
    /// - `LLM_OPENAI_BASE_URL` / `LLM_OLLAMA_BASE_URL`
    /// - `LLM_MAX_TOKENS`: default 1024
    /// - `LLM_REQUEST_TIMEOUT_SECS`: default 120
    /// - `LLM_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::ConfigParse`] for an unknown provider and
    /// [`LlmError::MissingApiKey`] when `OpenAI` is selected without a key.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LlmError> {
        let provider = parse_provider(non_empty(&lookup, "LLM_PROVIDER").as_deref())?;

        let api_key = match provider {
            LlmProviderKind::OpenAi => {
                let key_var = non_empty(&lookup, "LLM_API_KEY_ENV").unwrap_or_else(|| DEFAULT_API_KEY_ENV.to_owned());
                non_empty(&lookup, &key_var).ok_or(LlmError::MissingApiKey { var: key_var })?
            }
            LlmProviderKind::Ollama => String::new(),
        };

        let model = non_empty(&lookup, "LLM_MODEL").unwrap_or_else(|| default_model(provider).to_owned());
        let base_url = match provider {
            LlmProviderKind::OpenAi => non_empty(&lookup, "LLM_OPENAI_BASE_URL"),
            LlmProviderKind::Ollama => non_empty(&lookup, "LLM_OLLAMA_BASE_URL"),
        }
        .unwrap_or_else(|| default_base_url(provider).to_owned())
        .trim_end_matches('/')
        .to_owned();

        let timeouts = LlmTimeouts {
            request_secs: parse_or(&lookup, "LLM_REQUEST_TIMEOUT_SECS", DEFAULT_LLM_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_or(&lookup, "LLM_CONNECT_TIMEOUT_SECS", DEFAULT_LLM_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self {
            provider,
            api_key,
            model,
            base_url,
            max_tokens: parse_or(&lookup, "LLM_MAX_TOKENS", DEFAULT_LLM_MAX_TOKENS),
            timeouts,
        })
    }
}

fn parse_provider(raw: Option<&str>) -> Result<LlmProviderKind, LlmError> {
    match raw.unwrap_or("openai") {
        "openai" => Ok(LlmProviderKind::OpenAi),
        "ollama" => Ok(LlmProviderKind::Ollama),
        other => Err(LlmError::ConfigParse(format!("unknown LLM_PROVIDER: {other}"))),
    }
}

fn default_model(provider: LlmProviderKind) -> &'static str {
    match provider {
        LlmProviderKind::OpenAi => "gpt-4o-mini",
        LlmProviderKind::Ollama => "mistral",
    }
}

fn default_base_url(provider: LlmProviderKind) -> &'static str {
    match provider {
        LlmProviderKind::OpenAi => DEFAULT_OPENAI_BASE_URL,
        LlmProviderKind::Ollama => DEFAULT_OLLAMA_BASE_URL,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
