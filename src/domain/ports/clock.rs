use async_trait::async_trait;
use std::time::{Duration, Instant};

/// Monotonic time source with a sleep primitive.
///
/// The condition poller never touches wall-clock time directly; tests inject
/// a virtual clock so attempt counts are reproducible.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current monotonic instant.
    fn now(&self) -> Instant;

    /// Suspend the caller for `duration`.
    async fn sleep(&self, duration: Duration);
}
