use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;

/// The caller's live session, resolved from `Authorization: Bearer <token>`.
pub struct AuthUser {
    pub username: String,
    pub token: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Auth("Not authenticated".to_string()))?;

        let token = bearer_token(auth_header)
            .ok_or_else(|| AppError::Auth("Invalid authorization header format".to_string()))?;

        let user = state.authority.current_user(token)?;

        Ok(AuthUser {
            username: user.username,
            token: token.to_string(),
        })
    }
}

/// The credential from `<scheme> <token>` when the scheme is `Bearer` in any case.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then_some(token)
}
