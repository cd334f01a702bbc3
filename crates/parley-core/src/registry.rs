//! Live connection set and broadcast fanout.
//!
//! Each connection is registered with a [`MessageSink`] once the transport
//! handshake is done. Its identity is resolved from the token it presents
//! with every inbound message, never at the handshake.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tokio::sync::RwLock;

use crate::authority::TokenAuthority;
use crate::error::{DeliveryError, RelayError};

/// Outbound half of a client connection.
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Queue `text` for delivery. A slow send delays only this sink.
    async fn send(&self, text: &str) -> Result<(), DeliveryError>;

    /// Ask the transport to close the connection.
    async fn close(&self);
}

/// Registry-assigned connection id. Ids increase with registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Lifecycle as seen by the registry.
///
/// The connecting phase is the transport handshake, which completes before
/// `register`. A registered id is `Open` until it is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Open,
    Closed,
}

/// Delivery counts for one broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub failed: usize,
}

struct Connection {
    sink: Arc<dyn MessageSink>,
    identity: Option<String>,
}

pub fn chat_message(username: &str, payload: &str) -> String {
    format!("Client #{username} says: {payload}")
}

pub fn departure_message(username: &str) -> String {
    format!("Client #{username} left the chat")
}

pub struct ConnectionRegistry {
    authority: Arc<TokenAuthority>,
    connections: RwLock<BTreeMap<ConnectionId, Connection>>,
    next_id: AtomicU64,
}

impl ConnectionRegistry {
    pub fn new(authority: Arc<TokenAuthority>) -> Self {
        Self {
            authority,
            connections: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn authority(&self) -> &Arc<TokenAuthority> {
        &self.authority
    }

    /// Add an accepted connection. It has no identity until its first
    /// verified message.
    pub async fn register(&self, sink: Arc<dyn MessageSink>) -> ConnectionId {
        let id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut connections = self.connections.write().await;
        connections.insert(
            id,
            Connection {
                sink,
                identity: None,
            },
        );
        tracing::debug!(conn_id = %id, live = connections.len(), "Connection registered");
        id
    }

    /// Handle one inbound message.
    ///
    /// The token is re-verified every time, since a later login may have
    /// superseded it. On failure the connection is closed and removed
    /// without a departure notice, and the error is returned to the caller
    /// for logging only.
    pub async fn on_message(
        &self,
        id: ConnectionId,
        token: &str,
        payload: &str,
    ) -> Result<BroadcastReport, RelayError> {
        let username = match self.authority.verify(token) {
            Ok(username) => username,
            Err(e) => {
                tracing::warn!(conn_id = %id, "Closing connection after failed verification: {e}");
                self.evict(id).await;
                return Err(e.into());
            }
        };

        {
            let mut connections = self.connections.write().await;
            let connection = connections
                .get_mut(&id)
                .ok_or(RelayError::UnknownConnection(id))?;
            connection.identity = Some(username.clone());
        }

        Ok(self.broadcast(&chat_message(&username, payload)).await)
    }

    /// Deliver `text` to every connection registered right now.
    ///
    /// Membership is snapshotted first so no lock is held while sending.
    /// Sends start in id order and run concurrently, so one slow sink does
    /// not hold back the rest. A failed send is counted and skipped.
    pub async fn broadcast(&self, text: &str) -> BroadcastReport {
        let targets: Vec<(ConnectionId, Arc<dyn MessageSink>)> = {
            let connections = self.connections.read().await;
            connections
                .iter()
                .map(|(id, connection)| (*id, connection.sink.clone()))
                .collect()
        };

        let sends = targets.iter().map(|(_, sink)| sink.send(text));
        let results = join_all(sends).await;

        let mut report = BroadcastReport::default();
        for ((id, _), result) in targets.iter().zip(results) {
            match result {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    tracing::debug!(conn_id = %id, "Broadcast delivery failed: {e}");
                    report.failed += 1;
                }
            }
        }
        report
    }

    /// Remove a connection. If it had an identity, the remaining connections
    /// are told it left. Returns `false` if the id was not registered.
    pub async fn unregister(&self, id: ConnectionId) -> bool {
        let removed = self.connections.write().await.remove(&id);
        let Some(connection) = removed else {
            return false;
        };
        tracing::debug!(conn_id = %id, "Connection unregistered");

        if let Some(username) = connection.identity {
            self.broadcast(&departure_message(&username)).await;
        }
        true
    }

    pub async fn state(&self, id: ConnectionId) -> ConnectionState {
        if self.connections.read().await.contains_key(&id) {
            ConnectionState::Open
        } else {
            ConnectionState::Closed
        }
    }

    pub async fn identity(&self, id: ConnectionId) -> Option<String> {
        self.connections
            .read()
            .await
            .get(&id)
            .and_then(|connection| connection.identity.clone())
    }

    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }

    async fn evict(&self, id: ConnectionId) {
        let removed = self.connections.write().await.remove(&id);
        if let Some(connection) = removed {
            connection.sink.close().await;
        }
    }
}
