//! Timeout-bounded retry loop.
//!
//! [`ConditionPoller::poll`] invokes a condition until it reports
//! [`PollOutcome::Converged`], reports [`PollOutcome::HardError`], or the
//! deadline of the [`TimeoutSpec`] is reached. The first attempt runs
//! immediately; the injected [`Clock`] sleeps only between attempts.

use std::future::Future;
use std::sync::Arc;

use crate::domain::errors::PollError;
use crate::domain::models::{PollOutcome, TimeoutSpec};
use crate::domain::ports::Clock;

/// Bounded polling driven by an injected clock.
#[derive(Clone)]
pub struct ConditionPoller {
    clock: Arc<dyn Clock>,
}

impl ConditionPoller {
    /// Create a poller on top of `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Poll `condition` until it converges, aborts, or `spec.deadline()` elapses.
    ///
    /// An attempt is never interrupted: the deadline is checked after each
    /// attempt completes, and polling stops once the elapsed time has
    /// reached the deadline (`elapsed >= deadline`). The last attempt may
    /// start exactly at the deadline, never after it. With an instantaneous condition the loop gives up at
    /// most one interval past the deadline; 180 s / 5 s makes 37 attempts.
    pub async fn poll<T, F, Fut>(&self, spec: &TimeoutSpec, mut condition: F) -> Result<T, PollError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = PollOutcome<T>>,
    {
        let started = self.clock.now();
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;

            match condition().await {
                PollOutcome::Converged(value) => return Ok(value),
                PollOutcome::HardError(cause) => return Err(PollError::Aborted(cause)),
                PollOutcome::NotYetConverged => {}
            }

            if self.clock.now().saturating_duration_since(started) >= spec.deadline() {
                return Err(PollError::Timeout {
                    deadline: spec.deadline(),
                    attempts,
                });
            }

            self.clock.sleep(spec.interval()).await;
        }
    }
}
