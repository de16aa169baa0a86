//! Fleet change propagation.
//!
//! - [`ChangeNotifier`] keeps a long-lived subscription to the record store's
//!   [`ChangeFeed`](fleet_db::ChangeFeed) and hands every event to a
//!   [`Broadcaster`].
//! - [`reconnect`] holds the exponential-backoff policy used when the feed
//!   drops or cannot be opened.

pub mod broadcaster;
pub mod notifier;
pub mod reconnect;

pub use broadcaster::Broadcaster;
pub use notifier::{ChangeNotifier, NotifierError, DEFAULT_EVENT_NAME};
pub use reconnect::ReconnectConfig;
