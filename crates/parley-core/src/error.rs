//! Error types for `parley-core`.
//!
//! Authentication and token checks return [`AuthResult<T>`]. The live message
//! path wraps those failures in [`RelayError`], and transport handles report
//! [`DeliveryError`].

use crate::registry::ConnectionId;

/// Failure taxonomy for login and token verification.
///
/// `MalformedToken`, `Expired` and `Superseded` are kept distinct so callers
/// can tell "log in again" apart from "drop the connection".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Unknown username or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Bad signature, bad structure, or claims that cannot be decoded.
    #[error("malformed token")]
    MalformedToken,

    /// The token's `exp` is not in the future.
    #[error("token expired")]
    Expired,

    /// A newer login replaced this token as the user's live session.
    #[error("token superseded by a newer session")]
    Superseded,

    /// The token is valid but its subject has no credential record.
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// Hashing or signing failed for reasons unrelated to the caller's input.
    #[error("internal auth error: {0}")]
    Internal(String),
}

/// Convenience alias used by the token authority and its collaborators.
pub type AuthResult<T> = Result<T, AuthError>;

/// Errors surfaced by the connection registry's message path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The connection was already removed from the registry.
    #[error("unknown connection: {0}")]
    UnknownConnection(ConnectionId),
}

/// A transport handle could not accept an outbound message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("connection closed")]
    Closed,

    /// The connection's outbound queue is full; the message was dropped.
    #[error("outbound queue full")]
    Backpressure,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_failures_have_distinct_messages() {
        let messages = [
            AuthError::MalformedToken.to_string(),
            AuthError::Expired.to_string(),
            AuthError::Superseded.to_string(),
        ];
        assert_eq!(messages[0], "malformed token");
        assert_eq!(messages[1], "token expired");
        assert_eq!(messages[2], "token superseded by a newer session");
    }

    #[test]
    fn user_not_found_displays_username() {
        let err = AuthError::UserNotFound("alice".to_string());
        assert_eq!(err.to_string(), "user not found: alice");
    }

    #[test]
    fn relay_error_from_auth_is_transparent() {
        let err: RelayError = AuthError::Expired.into();
        assert!(matches!(err, RelayError::Auth(AuthError::Expired)));
        assert_eq!(err.to_string(), "token expired");
    }

    #[test]
    fn unknown_connection_displays_id() {
        let err = RelayError::UnknownConnection(ConnectionId::from_raw(7));
        assert_eq!(err.to_string(), "unknown connection: conn-7");
    }

    #[test]
    fn delivery_closed_displays_message() {
        assert_eq!(DeliveryError::Closed.to_string(), "connection closed");
        assert_eq!(DeliveryError::Backpressure.to_string(), "outbound queue full");
    }
}
