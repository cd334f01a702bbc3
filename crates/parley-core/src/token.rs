//! Signed, self-contained bearer tokens (HS256 JWTs).
//!
//! The codec only performs the stateless checks: signature, structure and
//! expiry. Whether a token is still the user's live session is decided by
//! [`TokenAuthority`](crate::authority::TokenAuthority).

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: u64,
    pub exp: u64,
    /// Random per-token id, so two tokens issued to one user in the same
    /// second are still different strings.
    pub jti: String,
}

impl Claims {
    /// `exp` is `issued_at + ttl`, with any sub-second part of `ttl`
    /// rounded up to a whole second.
    pub fn new(username: &str, issued_at: u64, ttl: Duration) -> Self {
        let ttl_secs = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
        Self {
            sub: username.to_string(),
            iat: issued_at,
            exp: issued_at.saturating_add(ttl_secs),
            jti: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn is_expired_at(&self, now: u64) -> bool {
        now >= self.exp
    }
}

/// A freshly signed token and its expiry (seconds since the Unix epoch).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: u64,
}

pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against `now >= exp` in `decode`, with no leeway.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn encode(&self, claims: &Claims) -> AuthResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AuthError::Internal(format!("failed to sign token: {e}")))
    }

    /// Decode and check a token against `now`.
    ///
    /// Signature and structure failures map to [`AuthError::MalformedToken`];
    /// a well-formed token whose `exp` has been reached maps to
    /// [`AuthError::Expired`].
    pub fn decode(&self, token: &str, now: u64) -> AuthResult<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            tracing::debug!("token rejected: {e}");
            AuthError::MalformedToken
        })?;

        if data.claims.is_expired_at(now) {
            return Err(AuthError::Expired);
        }
        Ok(data.claims)
    }
}

/// Current time in whole seconds since the Unix epoch.
pub fn unix_now() -> AuthResult<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| AuthError::Internal(format!("system clock before Unix epoch: {e}")))
}
