//! Account routes and the bearer-token extractor.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRef, Query, State};
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::response::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::services::account::{self, LoginRequest, PublicUser, RegisterRequest};
use crate::services::token::{Claims, TokenError};
use crate::state::AppState;

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Authenticated caller, taken from `Authorization: Bearer <token>`.
/// Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub claims: Claims,
}

impl AuthUser {
    /// Chat author label for this caller.
    #[must_use]
    pub fn author(&self) -> &str {
        self.claims.author_label()
    }
}

pub(crate) fn bearer_token(headers: &axum::http::HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(TokenError::Missing)?;
        let app_state = AppState::from_ref(state);
        let claims = app_state.tokens.verify(token)?;
        Ok(Self { claims })
    }
}

/// Map a body parse failure onto the uniform error shape.
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(value)| value)
        .map_err(|e| AppError::bad_request(e.body_text()))
}

/// Map a query-string parse failure onto the uniform error shape.
pub(crate) fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    query.map(|Query(value)| value)
        .map_err(|e| AppError::bad_request(e.body_text()))
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: &'static str,
    pub user: PublicUser,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: &'static str,
    pub token: String,
    pub user: PublicUser,
}

#[derive(Serialize)]
pub struct MeResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// `POST /register`
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let req = json_body(body)?;
    let user = account::register(state.users.as_ref(), req, state.bcrypt_cost).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse { success: true, message: "User registered successfully", user }),
    ))
}

/// `POST /login`
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let req = json_body(body)?;
    let user = account::login(state.users.as_ref(), req).await?;
    let token = state.tokens.issue(&user)?;
    tracing::info!(user_id = %user.id, "login succeeded");
    Ok(Json(LoginResponse { success: true, message: "Login successful", token, user }))
}

/// `GET /me`
pub async fn me(auth: AuthUser) -> Result<Json<MeResponse>, AppError> {
    let id = auth.claims.user_id()?;
    Ok(Json(MeResponse { id, name: auth.claims.name, email: auth.claims.email }))
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
