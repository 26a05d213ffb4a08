//! Chatbot proxy route.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use super::auth::json_body;
use crate::error::AppError;
use crate::services::chatbot;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
}

/// `POST /chatbot`
pub async fn ask(
    State(state): State<AppState>,
    body: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, AppError> {
    let req = json_body(body)?;
    let answer = chatbot::ask(state.llm.as_deref(), &state.rate_limiter, state.llm_max_tokens, &req.question).await?;
    Ok(Json(AskResponse { answer }))
}

#[cfg(test)]
#[path = "chatbot_test.rs"]
mod tests;
