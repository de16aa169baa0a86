use std::collections::HashMap;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::ws::Message;
use fleet_core::types::Timestamp;
use fleet_events::Broadcaster;
use serde_json::json;
use tokio::sync::{mpsc, RwLock};

/// Channel sender half for pushing messages to a WebSocket connection.
pub type SubscriberSender = mpsc::UnboundedSender<Message>;

/// A single connected real-time client.
pub struct Subscriber {
    /// Outbound queue; FIFO per connection.
    pub sender: SubscriberSender,
    /// When this connection was established.
    pub connected_at: Timestamp,
}

/// Tracks every connected real-time client and fans messages out to them.
///
/// Thread-safe via interior `RwLock`; wrap in `Arc` and share between the
/// WebSocket handler, the heartbeat task and the change notifier.
pub struct SubscriberRegistry {
    subscribers: RwLock<HashMap<String, Subscriber>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new connection.
    ///
    /// Returns the receiver half of the message channel so the caller can
    /// forward messages to the WebSocket sink. Only messages broadcast after
    /// this call are delivered.
    pub async fn add(&self, conn_id: String) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscriber = Subscriber {
            sender: tx,
            connected_at: chrono::Utc::now(),
        };
        self.subscribers.write().await.insert(conn_id, subscriber);
        rx
    }

    /// Remove a connection by its ID.
    pub async fn remove(&self, conn_id: &str) {
        if let Some(sub) = self.subscribers.write().await.remove(conn_id) {
            let connected_secs = (chrono::Utc::now() - sub.connected_at).num_seconds();
            tracing::debug!(conn_id, connected_secs, "Subscriber removed");
        }
    }

    /// Send `payload` under `event_name` to every connected client.
    ///
    /// Fire-and-forget: connections whose channels are already closed are
    /// skipped and cleaned up by their own receive loop.
    pub async fn broadcast(&self, event_name: &str, payload: serde_json::Value) -> usize {
        let frame = json!({ "event": event_name, "data": payload }).to_string();
        let message = Message::Text(frame.into());

        let subs = self.subscribers.read().await;
        let mut delivered = 0;
        for sub in subs.values() {
            if sub.sender.send(message.clone()).is_ok() {
                delivered += 1;
            }
        }
        delivered
    }

    /// Return the current number of active connections.
    pub async fn connection_count(&self) -> usize {
        self.subscribers.read().await.len()
    }

    /// Send a Close frame to every connection, then clear the map.
    ///
    /// Used during graceful shutdown to notify all clients before the
    /// server stops accepting new connections.
    pub async fn shutdown_all(&self) {
        let mut subs = self.subscribers.write().await;
        let count = subs.len();
        for sub in subs.values() {
            let _ = sub.sender.send(Message::Close(None));
        }
        subs.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Send a Ping frame to every connected client.
    pub async fn ping_all(&self) {
        let subs = self.subscribers.read().await;
        for sub in subs.values() {
            let _ = sub.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Broadcaster for SubscriberRegistry {
    async fn broadcast(&self, event_name: &str, payload: serde_json::Value) {
        let delivered = SubscriberRegistry::broadcast(self, event_name, payload).await;
        tracing::debug!(event_name, delivered, "Broadcast change");
    }
}
