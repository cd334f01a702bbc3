//! Login, token issuance and token verification.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{AuthError, AuthResult};
use crate::password::{Argon2Hasher, CredentialHasher};
use crate::session::{RevokeOutcome, SessionRegistry};
use crate::store::{CredentialStore, UserRecord};
use crate::token::{unix_now, Claims, IssuedToken, TokenCodec};

/// Result of [`TokenAuthority::signup`]. Signup overwrites existing users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupOutcome {
    Created,
    Replaced,
}

/// Issues and verifies bearer tokens and owns the live-session pointers.
///
/// Verification is stateless (signature and expiry) plus one lookup: the
/// presented token must still be the subject's live session.
pub struct TokenAuthority {
    store: Arc<dyn CredentialStore>,
    hasher: Arc<dyn CredentialHasher>,
    sessions: SessionRegistry,
    codec: TokenCodec,
}

impl TokenAuthority {
    /// Authority backed by `store`, hashing with Argon2.
    pub fn new(secret: &str, store: Arc<dyn CredentialStore>) -> Self {
        Self::with_hasher(secret, store, Arc::new(Argon2Hasher))
    }

    pub fn with_hasher(
        secret: &str,
        store: Arc<dyn CredentialStore>,
        hasher: Arc<dyn CredentialHasher>,
    ) -> Self {
        Self {
            store,
            hasher,
            sessions: SessionRegistry::new(),
            codec: TokenCodec::new(secret),
        }
    }

    /// Check a username/password pair against the credential store.
    pub fn authenticate(&self, username: &str, password: &str) -> AuthResult<UserRecord> {
        let Some(user) = self.store.get(username) else {
            tracing::warn!("Failed login attempt for unknown user: {username}");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.hasher.verify(&user.password_hash, password)? {
            tracing::warn!("Failed login attempt for user: {username}");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Sign a token for `username` valid for `ttl` and make it the user's
    /// only live session. Any earlier token for the user stops verifying.
    pub fn issue(&self, username: &str, ttl: Duration) -> AuthResult<IssuedToken> {
        let claims = Claims::new(username, unix_now()?, ttl);
        let token = self.codec.encode(&claims)?;

        if self.sessions.set_live(username, &token).is_some() {
            tracing::info!("New login for {username} superseded the previous session");
        }

        Ok(IssuedToken {
            token,
            expires_at: claims.exp,
        })
    }

    /// Verify `token` and return its subject.
    pub fn verify(&self, token: &str) -> AuthResult<String> {
        let claims = self.codec.decode(token, unix_now()?)?;

        if !self.sessions.is_live(&claims.sub, token) {
            return Err(AuthError::Superseded);
        }
        Ok(claims.sub)
    }

    /// Verify `token` and load the subject's record.
    pub fn current_user(&self, token: &str) -> AuthResult<UserRecord> {
        let username = self.verify(token)?;
        self.store
            .get(&username)
            .ok_or(AuthError::UserNotFound(username))
    }

    pub fn hash(&self, password: &str) -> AuthResult<String> {
        self.hasher.hash(password)
    }

    /// Store `username` with the hash of the plaintext `password`.
    ///
    /// An existing user with the same name is overwritten.
    pub fn signup(&self, username: &str, password: &str) -> AuthResult<SignupOutcome> {
        let record = UserRecord::new(username, self.hash(password)?);
        match self.store.put(record) {
            Some(_) => {
                tracing::warn!("Signup replaced existing user: {username}");
                Ok(SignupOutcome::Replaced)
            }
            None => {
                tracing::info!("User created: {username}");
                Ok(SignupOutcome::Created)
            }
        }
    }

    pub fn revoke_others(&self, username: &str, caller_token: &str) -> RevokeOutcome {
        self.sessions.revoke_others(username, caller_token)
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn store(&self) -> &dyn CredentialStore {
        self.store.as_ref()
    }
}
