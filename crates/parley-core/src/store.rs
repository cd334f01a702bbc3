//! Credential storage.
//!
//! The core only needs get/put/exists over `username -> UserRecord`, so the
//! store is a trait. [`MemoryCredentialStore`] is the process-lifetime
//! implementation the server runs with.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// A registered user. `password_hash` is opaque to everything except the
/// [`CredentialHasher`](crate::password::CredentialHasher) that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub password_hash: String,
}

impl UserRecord {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
        }
    }
}

/// Key-value access to user records, keyed by username.
pub trait CredentialStore: Send + Sync {
    fn get(&self, username: &str) -> Option<UserRecord>;

    /// Store `record` under its username, returning the record it replaced.
    fn put(&self, record: UserRecord) -> Option<UserRecord>;

    fn exists(&self, username: &str) -> bool {
        self.get(username).is_some()
    }
}

/// In-memory store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    users: DashMap<String, UserRecord>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `records`. Later duplicates win.
    pub fn with_users(records: impl IntoIterator<Item = UserRecord>) -> Self {
        let store = Self::new();
        for record in records {
            store.put(record);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, username: &str) -> Option<UserRecord> {
        self.users.get(username).map(|entry| entry.value().clone())
    }

    fn put(&self, record: UserRecord) -> Option<UserRecord> {
        self.users.insert(record.username.clone(), record)
    }

    fn exists(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_store_is_empty() {
        let store = MemoryCredentialStore::new();
        assert!(store.is_empty());
        assert!(!store.exists("alice"));
        assert_eq!(store.get("alice"), None);
    }

    #[test]
    fn put_then_get_returns_record() {
        let store = MemoryCredentialStore::new();
        assert_eq!(store.put(UserRecord::new("alice", "h1")), None);

        assert!(store.exists("alice"));
        assert_eq!(store.get("alice"), Some(UserRecord::new("alice", "h1")));
    }

    #[test]
    fn put_overwrites_and_returns_previous() {
        let store = MemoryCredentialStore::new();
        store.put(UserRecord::new("alice", "h1"));

        let previous = store.put(UserRecord::new("alice", "h2"));

        assert_eq!(previous, Some(UserRecord::new("alice", "h1")));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("alice").unwrap().password_hash, "h2");
    }

    #[test]
    fn with_users_seeds_records() {
        let store = MemoryCredentialStore::with_users([
            UserRecord::new("alice", "a"),
            UserRecord::new("bob", "b"),
            UserRecord::new("alice", "a2"),
        ]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("alice").unwrap().password_hash, "a2");
    }

    #[test]
    fn usernames_are_case_sensitive() {
        let store = MemoryCredentialStore::with_users([UserRecord::new("Alice", "h")]);
        assert!(store.exists("Alice"));
        assert!(!store.exists("alice"));
    }
}
