//! Community chat history routes.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::{DateTime, Utc};
use frames::ChatMessage;
use serde::Deserialize;

use super::auth::{AuthUser, json_body, query_params};
use crate::error::AppError;
use crate::services::message;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

/// Body of `POST /messages`. Author fields in the body are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct PostMessageRequest {
    #[serde(default, alias = "message")]
    pub text: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// `GET /messages[?limit=N]`
pub async fn list_messages(
    State(state): State<AppState>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<Vec<ChatMessage>>, AppError> {
    let query = query_params(query)?;
    Ok(Json(message::recent(state.messages.as_ref(), query.limit).await?))
}

/// `POST /messages`
pub async fn post_message(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Result<Json<PostMessageRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ChatMessage>), AppError> {
    let req = json_body(body)?;
    let text = req.text.unwrap_or_default();
    let stored = message::post(state.messages.as_ref(), auth.author(), &text, req.timestamp).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

#[cfg(test)]
#[path = "messages_test.rs"]
mod tests;
