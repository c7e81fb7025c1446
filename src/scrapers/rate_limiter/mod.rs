//! Fixed-interval request gate.
//!
//! Each job owns one gate. The first request passes immediately; every later
//! request waits until the configured interval has elapsed since the previous
//! request completed.

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Default)]
pub struct IntervalGate {
    interval: Option<Duration>,
    last_request: Option<Instant>,
}

impl IntervalGate {
    /// Create a gate; `None` never waits.
    pub fn new(interval: Option<Duration>) -> Self {
        Self {
            interval,
            last_request: None,
        }
    }

    pub fn unthrottled() -> Self {
        Self::new(None)
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// Time left before the next request may start.
    pub fn time_until_ready(&self) -> Duration {
        match (self.interval, self.last_request) {
            (Some(interval), Some(last)) => (last + interval).saturating_duration_since(Instant::now()),
            _ => Duration::ZERO,
        }
    }

    /// Wait until the next request may start.
    pub async fn wait(&self) {
        let wait_time = self.time_until_ready();
        if wait_time > Duration::ZERO {
            debug!("Rate limiting: waiting {:?}", wait_time);
            tokio::time::sleep(wait_time).await;
        }
    }

    /// Record that a request just completed.
    pub fn mark(&mut self) {
        self.last_request = Some(Instant::now());
    }
}
