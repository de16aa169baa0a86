//! Resubscription backoff for the change feed.

use std::time::Duration;

/// Delay policy between failed feed subscriptions.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Wait after the first failure, and again after any recovery.
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

/// Running backoff state for one notifier loop.
///
/// Each [`next_wait`](Backoff::next_wait) hands out the current delay and
/// grows it for the following call. A successful subscription calls
/// [`reset`](Backoff::reset) so that a later outage starts over from the
/// initial delay instead of inheriting an old, long wait.
#[derive(Debug)]
pub struct Backoff {
    config: ReconnectConfig,
    current: Duration,
    failures: u32,
}

impl Backoff {
    pub fn new(config: ReconnectConfig) -> Self {
        Self {
            current: config.initial_delay,
            config,
            failures: 0,
        }
    }

    /// Delay the next call to [`next_wait`](Backoff::next_wait) will return.
    pub fn current(&self) -> Duration {
        self.current
    }

    /// Failed subscriptions since the last reset.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn record_failure(&mut self) {
        self.failures = self.failures.saturating_add(1);
    }

    pub fn next_wait(&mut self) -> Duration {
        let wait = self.current;
        let grown = Duration::try_from_secs_f64(self.current.as_secs_f64() * self.config.multiplier)
            .unwrap_or(self.config.max_delay);
        self.current = grown.min(self.config.max_delay);
        wait
    }

    pub fn reset(&mut self) {
        self.current = self.config.initial_delay;
        self.failures = 0;
    }
}
