//! Ollama client using the non-streaming `/api/generate` endpoint.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::config::LlmTimeouts;
use super::types::{ChatResponse, LlmError, Message};

pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    model: String,
    #[serde(default)]
    prompt_eval_count: u64,
    #[serde(default)]
    eval_count: u64,
}

impl OllamaClient {
    /// # Errors
    ///
    /// Returns [`LlmError::HttpClientBuild`] if the HTTP client fails to build.
    pub fn new(base_url: String, timeouts: LlmTimeouts) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| LlmError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url })
    }

    pub async fn chat(
        &self,
        model: &str,
        max_tokens: u32,
        system: &str,
        messages: &[Message],
    ) -> Result<ChatResponse, LlmError> {
        let body = GenerateRequest {
            model,
            prompt: flatten_prompt(messages),
            system: Some(system).filter(|s| !s.trim().is_empty()),
            stream: false,
            options: GenerateOptions { num_predict: max_tokens },
        };
        let url = format!("{}/api/generate", self.base_url);
        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;
        if status != 200 {
            return Err(LlmError::ApiResponse { status, body: text });
        }
        parse_generate_response(&text)
    }
}

/// `/api/generate` takes one prompt string. A single user turn passes through
/// unchanged; longer histories are rendered as `role: content` lines.
fn flatten_prompt(messages: &[Message]) -> String {
    match messages {
        [only] => only.content.clone(),
        _ => messages
            .iter()
            .map(|m| format!("{}: {}", m.role, m.content))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

pub(crate) fn parse_generate_response(json_text: &str) -> Result<ChatResponse, LlmError> {
    let parsed: GenerateResponse = serde_json::from_str(json_text).map_err(|e| LlmError::ApiParse(e.to_string()))?;
    Ok(ChatResponse {
        text: parsed.response.trim().to_owned(),
        model: parsed.model,
        input_tokens: parsed.prompt_eval_count,
        output_tokens: parsed.eval_count,
    })
}

#[cfg(test)]
#[path = "ollama_test.rs"]
mod tests;
