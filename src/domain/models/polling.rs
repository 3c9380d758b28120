//! Polling primitives shared by the poller and its callers.

use std::time::Duration;

use crate::domain::errors::ConfigError;

/// Deadline and retry interval for one bounded polling loop.
///
/// Both durations are strictly positive; use [`TimeoutSpec::new`] to build
/// one from untrusted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutSpec {
    deadline: Duration,
    interval: Duration,
}

impl TimeoutSpec {
    /// Default deadline for a convergence poll.
    pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(180);
    /// Default wait between two attempts.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

    /// Validate and build a timeout specification.
    pub fn new(deadline: Duration, interval: Duration) -> Result<Self, ConfigError> {
        if deadline.is_zero() || interval.is_zero() {
            return Err(ConfigError::InvalidTimeout {
                deadline_ms: deadline.as_millis(),
                interval_ms: interval.as_millis(),
            });
        }
        Ok(Self { deadline, interval })
    }

    /// Convenience constructor from whole seconds.
    pub fn from_secs(deadline_secs: u64, interval_secs: u64) -> Result<Self, ConfigError> {
        Self::new(
            Duration::from_secs(deadline_secs),
            Duration::from_secs(interval_secs),
        )
    }

    /// Total time budget of the poll.
    pub const fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Wait between two consecutive attempts.
    pub const fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for TimeoutSpec {
    fn default() -> Self {
        Self {
            deadline: Self::DEFAULT_DEADLINE,
            interval: Self::DEFAULT_INTERVAL,
        }
    }
}

/// Result of a single polling attempt.
///
/// `Converged` carries whatever the condition wants to hand back to the
/// caller once polling stops (the fresh snapshot for convergence checks).
#[derive(Debug)]
pub enum PollOutcome<T = ()> {
    /// The awaited condition holds; polling stops successfully.
    Converged(T),
    /// Not there yet; sleep and try again.
    NotYetConverged,
    /// Unrecoverable failure; polling stops without further attempts.
    HardError(anyhow::Error),
}

impl<T> PollOutcome<T> {
    /// Whether this outcome ends the poll successfully.
    pub const fn is_converged(&self) -> bool {
        matches!(self, Self::Converged(_))
    }
}
