use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use parley_core::{ConnectionId, ConnectionRegistry, DeliveryError, MessageSink};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::state::AppState;

/// Per-connection outbound queue depth. Messages to a full queue are dropped.
const OUTBOUND_BUFFER: usize = 64;

enum Outbound {
    Text(String),
    Close,
}

/// Registry-facing handle that feeds the connection's writer task.
struct ChannelSink {
    tx: mpsc::Sender<Outbound>,
}

#[async_trait]
impl MessageSink for ChannelSink {
    async fn send(&self, text: &str) -> Result<(), DeliveryError> {
        match self.tx.try_send(Outbound::Text(text.to_string())) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(DeliveryError::Backpressure),
            Err(TrySendError::Closed(_)) => Err(DeliveryError::Closed),
        }
    }

    async fn close(&self) {
        // If the queue is full the writer still stops once the sink is dropped.
        let _ = self.tx.try_send(Outbound::Close);
    }
}

/// Keeps a connection registered and guarantees `unregister` runs, even if
/// the connection task is cancelled before `release`.
struct Registration {
    registry: Arc<ConnectionRegistry>,
    id: ConnectionId,
    released: bool,
}

impl Registration {
    async fn open(registry: Arc<ConnectionRegistry>, sink: Arc<dyn MessageSink>) -> Self {
        let id = registry.register(sink).await;
        Self {
            registry,
            id,
            released: false,
        }
    }

    async fn release(mut self) {
        self.registry.unregister(self.id).await;
        self.released = true;
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let registry = self.registry.clone();
            let id = self.id;
            handle.spawn(async move {
                registry.unregister(id).await;
            });
        }
    }
}

/// Accepts the upgrade unconditionally. The path token is checked on every
/// inbound message instead, so a later login can cut this connection off.
pub async fn chat_handler(
    State(state): State<AppState>,
    Path(token): Path<String>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_chat(socket, state, token))
}

async fn handle_chat(socket: WebSocket, state: AppState, token: String) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<Outbound>(OUTBOUND_BUFFER);

    let registration = Registration::open(state.registry.clone(), Arc::new(ChannelSink { tx })).await;
    let conn_id = registration.id;
    tracing::info!(conn_id = %conn_id, "Chat connection opened");

    // Writer: drains the queue until the registry drops the sink or asks to close
    tokio::spawn(async move {
        while let Some(outbound) = rx.recv().await {
            match outbound {
                Outbound::Text(text) => {
                    if ws_sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Outbound::Close => {
                    let _ = ws_sender.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    });

    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                if let Err(e) = state.registry.on_message(conn_id, &token, text.as_str()).await {
                    tracing::info!(conn_id = %conn_id, "Chat connection dropped: {e}");
                    break;
                }
            }
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => {}
        }
    }

    registration.release().await;
    tracing::info!(conn_id = %conn_id, "Chat connection closed");
}
