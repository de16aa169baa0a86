use async_trait::async_trait;

/// Fan-out target for change events.
///
/// Implemented by the WebSocket subscriber registry. Delivery is
/// fire-and-forget: implementations must not block on slow receivers and
/// report nothing back.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    async fn broadcast(&self, event_name: &str, payload: serde_json::Value);
}
