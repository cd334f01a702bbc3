use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use parley_core::AuthError;
use serde::Serialize;

#[derive(Debug)]
pub enum AppError {
    Auth(String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Auth(detail) => (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, "Bearer")],
                axum::Json(ErrorBody { detail }),
            )
                .into_response(),
            AppError::Internal(msg) => {
                // Log the real error server-side, return generic message to client
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    axum::Json(ErrorBody {
                        detail: "Internal server error".to_string(),
                    }),
                )
                    .into_response()
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => {
                AppError::Auth("Incorrect username or password".to_string())
            }
            AuthError::MalformedToken
            | AuthError::Expired
            | AuthError::Superseded
            | AuthError::UserNotFound(_) => {
                tracing::debug!("Rejected bearer token: {e}");
                AppError::Auth("Could not validate credentials".to_string())
            }
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_error_is_401_with_challenge() {
        let response = AppError::Auth("nope".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
    }

    #[test]
    fn internal_error_is_500_without_challenge() {
        let response = AppError::Internal("db on fire".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }

    #[test]
    fn token_failures_share_one_message() {
        for err in [AuthError::MalformedToken, AuthError::Expired, AuthError::Superseded] {
            match AppError::from(err) {
                AppError::Auth(msg) => assert_eq!(msg, "Could not validate credentials"),
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn invalid_credentials_message() {
        assert!(matches!(
            AppError::from(AuthError::InvalidCredentials),
            AppError::Auth(msg) if msg == "Incorrect username or password"
        ));
    }
}
