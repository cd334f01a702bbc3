//! Password hashing behind [`CredentialHasher`], with an Argon2id default.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::{AuthError, AuthResult};

/// One-way password hashing used by signup and login.
///
/// Implementations must never log or retain the plaintext.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, password: &str) -> AuthResult<String>;

    /// Returns `Ok(false)` on mismatch. `Err` means `hash` could not be parsed.
    fn verify(&self, hash: &str, password: &str) -> AuthResult<bool>;
}

/// Argon2id with the crate's default parameters, producing PHC strings.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2Hasher;

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Internal(format!("failed to hash password: {e}")))?;

        Ok(hash.to_string())
    }

    fn verify(&self, hash: &str, password: &str) -> AuthResult<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AuthError::Internal(format!("invalid password hash: {e}")))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}
