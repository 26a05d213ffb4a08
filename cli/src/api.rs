//! HTTP client for the Huddle JSON API.

use frames::ChatMessage;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::CliError;
use crate::session::{Session, SessionUser};

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Deserialize)]
struct RegisterResponse {
    user: SessionUser,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
    user: SessionUser,
}

#[derive(Deserialize)]
struct AskResponse {
    answer: String,
}

impl ApiClient {
    #[must_use]
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            token,
        }
    }

    pub async fn ping(&self) -> Result<(), CliError> {
        let response = self.http.get(format!("{}/healthz", self.base_url)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CliError::Api { status: status.as_u16(), message: "health check failed".to_owned() });
        }
        Ok(())
    }

    pub async fn register(&self, name: &str, email: &str, phone: &str, password: &str) -> Result<SessionUser, CliError> {
        let body = json!({ "name": name, "email": email, "phone": phone, "password": password });
        let value = self.request(Method::POST, "/register", Some(body)).await?;
        Ok(serde_json::from_value::<RegisterResponse>(value)?.user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, CliError> {
        let body = json!({ "email": email, "password": password });
        let value = self.request(Method::POST, "/login", Some(body)).await?;
        let parsed: LoginResponse = serde_json::from_value(value)?;
        Ok(Session { token: parsed.token, user: parsed.user })
    }

    pub async fn me(&self) -> Result<Value, CliError> {
        self.request(Method::GET, "/me", None).await
    }

    pub async fn history(&self, limit: Option<usize>) -> Result<Vec<ChatMessage>, CliError> {
        let path = match limit {
            Some(limit) => format!("/messages?limit={limit}"),
            None => "/messages".to_owned(),
        };
        let value = self.request(Method::GET, &path, None).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn post_message(&self, text: &str) -> Result<ChatMessage, CliError> {
        let value = self.request(Method::POST, "/messages", Some(json!({ "text": text }))).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn ask(&self, question: &str) -> Result<String, CliError> {
        let value = self.request(Method::POST, "/chatbot", Some(json!({ "question": question }))).await?;
        Ok(serde_json::from_value::<AskResponse>(value)?.answer)
    }

    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, CliError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method, &url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(json) = body {
            request = request.json(&json);
        }

        let response = request.send().await?;
        let status = response.status();
        let value = response.json::<Value>().await.unwrap_or(Value::Null);

        if !status.is_success() {
            return Err(CliError::Api { status: status.as_u16(), message: error_message(status, &value) });
        }
        Ok(value)
    }
}

/// Human-readable message from an error body, falling back to the status.
pub(crate) fn error_message(status: StatusCode, body: &Value) -> String {
    body.get("message")
        .and_then(Value::as_str)
        .map_or_else(|| format!("HTTP {}", status.as_u16()), ToOwned::to_owned)
}

/// Convert an HTTP base URL to the relay websocket URL.
pub fn ws_url(base_url: &str) -> Result<String, CliError> {
    let base_url = base_url.trim_end_matches('/');
    if let Some(rest) = base_url.strip_prefix("http://") {
        return Ok(format!("ws://{rest}/ws"));
    }
    if let Some(rest) = base_url.strip_prefix("https://") {
        return Ok(format!("wss://{rest}/ws"));
    }

    Err(CliError::InvalidBaseUrl(base_url.to_owned()))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
