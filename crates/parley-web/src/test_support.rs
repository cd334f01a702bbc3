use std::sync::Arc;

use parley_core::{
    AuthResult, CredentialHasher, MemoryCredentialStore, TokenAuthority, UserRecord,
};

use crate::config::ServerConfig;
use crate::state::AppState;

pub const TEST_SECRET: &str = "web-test-secret-0123456789abcdef";

/// Stand-in for Argon2 so handler tests stay fast.
pub struct PlainHasher;

impl CredentialHasher for PlainHasher {
    fn hash(&self, password: &str) -> AuthResult<String> {
        Ok(format!("plain${password}"))
    }

    fn verify(&self, hash: &str, password: &str) -> AuthResult<bool> {
        Ok(hash == format!("plain${password}"))
    }
}

pub fn test_state(users: &[(&str, &str)]) -> AppState {
    let store = MemoryCredentialStore::with_users(
        users
            .iter()
            .map(|(name, pw)| UserRecord::new(*name, format!("plain${pw}"))),
    );
    let mut config = ServerConfig::default();
    config.auth.jwt_secret = TEST_SECRET.to_string();

    let authority = Arc::new(TokenAuthority::with_hasher(
        TEST_SECRET,
        Arc::new(store),
        Arc::new(PlainHasher),
    ));
    AppState::with_authority(config, authority)
}
