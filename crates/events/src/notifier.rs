//! Change-feed to subscriber fan-out.
//!
//! [`ChangeNotifier`] subscribes to a [`ChangeFeed`] once per process and
//! forwards every [`ChangeEvent`] to a [`Broadcaster`]. The channel is
//! best-effort: nothing is buffered for late subscribers and events emitted
//! while the feed is down are not replayed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use fleet_core::change::ChangeEvent;
use fleet_db::{ChangeFeed, ChangeStream, StoreError};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::broadcaster::Broadcaster;
use crate::reconnect::{Backoff, ReconnectConfig};

/// Event name used for broadcasts unless overridden.
pub const DEFAULT_EVENT_NAME: &str = "vehicle-change";

#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    #[error("change notifier already started")]
    AlreadyStarted,
}

/// How a single feed subscription ended.
enum FeedEnd {
    Cancelled,
    Disconnected,
    Failed(StoreError),
}

/// Re-broadcasts store change events to connected subscribers.
pub struct ChangeNotifier {
    feed: Arc<dyn ChangeFeed>,
    broadcaster: Arc<dyn Broadcaster>,
    event_name: String,
    reconnect: ReconnectConfig,
    started: AtomicBool,
}

impl ChangeNotifier {
    pub fn new(feed: Arc<dyn ChangeFeed>, broadcaster: Arc<dyn Broadcaster>) -> Self {
        Self {
            feed,
            broadcaster,
            event_name: DEFAULT_EVENT_NAME.to_string(),
            reconnect: ReconnectConfig::default(),
            started: AtomicBool::new(false),
        }
    }

    /// Override the broadcast event name.
    pub fn with_event_name(mut self, event_name: impl Into<String>) -> Self {
        self.event_name = event_name.into();
        self
    }

    /// Override the resubscription backoff.
    pub fn with_reconnect(mut self, reconnect: ReconnectConfig) -> Self {
        self.reconnect = reconnect;
        self
    }

    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    /// Spawn the feed loop.
    ///
    /// May be called once; later calls return [`NotifierError::AlreadyStarted`].
    /// The loop runs until `cancel` is triggered. Feed failures are logged
    /// and retried in the background, never surfaced to callers.
    pub fn start(self: &Arc<Self>, cancel: CancellationToken) -> Result<JoinHandle<()>, NotifierError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(NotifierError::AlreadyStarted);
        }

        let notifier = Arc::clone(self);
        Ok(tokio::spawn(async move { notifier.run(cancel).await }))
    }

    /// Forward one change event to every connected subscriber.
    pub async fn on_change(&self, event: &ChangeEvent) {
        match serde_json::to_value(event) {
            Ok(payload) => {
                tracing::debug!(
                    operation = ?event.operation,
                    vehicle_id = event.vehicle_id,
                    "Broadcasting vehicle change"
                );
                self.broadcaster.broadcast(&self.event_name, payload).await;
            }
            Err(e) => {
                tracing::error!(error = %e, vehicle_id = event.vehicle_id, "Failed to encode change event");
            }
        }
    }

    async fn run(&self, cancel: CancellationToken) {
        let mut backoff = Backoff::new(self.reconnect.clone());

        loop {
            let subscribed = tokio::select! {
                _ = cancel.cancelled() => break,
                result = self.feed.subscribe() => result,
            };

            match subscribed {
                Ok(stream) => {
                    tracing::info!(
                        failed_attempts = backoff.failures(),
                        "Subscribed to vehicle change feed"
                    );
                    backoff.reset();

                    match self.forward(stream, &cancel).await {
                        FeedEnd::Cancelled => break,
                        FeedEnd::Disconnected => {
                            tracing::warn!("Vehicle change feed disconnected, resubscribing");
                        }
                        FeedEnd::Failed(e) => {
                            tracing::warn!(error = %e, "Vehicle change feed failed, resubscribing");
                        }
                    }
                }
                Err(e) => {
                    backoff.record_failure();
                    tracing::warn!(
                        attempt = backoff.failures(),
                        error = %e,
                        delay_ms = backoff.current().as_millis() as u64,
                        "Vehicle change feed subscription failed",
                    );
                }
            }

            let wait = backoff.next_wait();
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(wait) => {}
            }
        }

        tracing::info!("Change notifier stopped");
    }

    async fn forward(&self, mut stream: ChangeStream, cancel: &CancellationToken) -> FeedEnd {
        loop {
            let item = tokio::select! {
                _ = cancel.cancelled() => return FeedEnd::Cancelled,
                item = stream.next() => item,
            };

            match item {
                Some(Ok(event)) => self.on_change(&event).await,
                Some(Err(e)) => return FeedEnd::Failed(e),
                None => return FeedEnd::Disconnected,
            }
        }
    }
}
