use axum::extract::State;
use axum::http::HeaderMap;
use axum::{Form, Json};

use crate::auth::middleware::AuthUser;
use crate::dto::*;
use crate::error::AppError;
use crate::state::AppState;

pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<TokenForm>,
) -> Result<Json<TokenResponse>, AppError> {
    let authority = state.authority.clone();
    let TokenForm { username, password } = form;

    let user = tokio::task::spawn_blocking(move || authority.authenticate(&username, &password))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let issued = state.authority.issue(&user.username, state.config.token_ttl())?;
    tracing::info!("Token issued for user: {}", user.username);

    Ok(Json(TokenResponse::bearer(issued.token)))
}

pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> Result<Json<StatusResponse>, AppError> {
    let authority = state.authority.clone();

    tokio::task::spawn_blocking(move || authority.signup(&body.username, &body.hashed_password))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(Json(StatusResponse {
        status: "user created",
    }))
}

/// Drop the caller's other sessions.
///
/// The token to keep is the second whitespace-separated field of the raw
/// `Authorization` header, which for a well-formed bearer header is the
/// caller's own token.
pub async fn clear_sessions(
    user: AuthUser,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<StatusResponse>, AppError> {
    let keep = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(' ').nth(1))
        .unwrap_or(user.token.as_str());

    let outcome = state.authority.revoke_others(&user.username, keep);
    tracing::info!("Clear sessions for user {}: {outcome:?}", user.username);

    Ok(Json(StatusResponse {
        status: "Other session deleted",
    }))
}
