//! Minimum spacing between outbound requests.

use std::time::Duration;

use tokio::time::Instant;

/// Spaces calls to [`Throttle::wait`] at least `interval` apart.
///
/// The first call never waits.
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    /// A throttle with the given spacing.
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Sleep until `interval` has passed since the previous call, then
    /// record now as the previous call.
    pub async fn wait(&mut self) {
        if let Some(ready) = self.last.and_then(|last| last.checked_add(self.interval)) {
            tokio::time::sleep_until(ready).await;
        }
        self.last = Some(Instant::now());
    }
}
