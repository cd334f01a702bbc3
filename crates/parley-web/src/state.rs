use std::sync::Arc;

use parley_core::{ConnectionRegistry, MemoryCredentialStore, TokenAuthority, UserRecord};

use crate::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub authority: Arc<TokenAuthority>,
    pub registry: Arc<ConnectionRegistry>,
}

impl AppState {
    /// Build the in-memory stores, seeding users from the config.
    pub fn new(config: ServerConfig) -> Self {
        let store = MemoryCredentialStore::with_users(
            config
                .users
                .iter()
                .map(|u| UserRecord::new(u.username.clone(), u.password_hash.clone())),
        );
        let authority = Arc::new(TokenAuthority::new(&config.auth.jwt_secret, Arc::new(store)));
        Self::with_authority(config, authority)
    }

    pub fn with_authority(config: ServerConfig, authority: Arc<TokenAuthority>) -> Self {
        let registry = Arc::new(ConnectionRegistry::new(authority.clone()));
        Self {
            config: Arc::new(config),
            authority,
            registry,
        }
    }
}
