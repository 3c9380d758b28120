//! Error taxonomy of the convergence harness.
//!
//! Every failure is returned as a typed value; nothing here is retried
//! implicitly except through the explicit polling loop.

use std::time::Duration;
use thiserror::Error;

use super::models::MutationTarget;

/// The external backend was unreachable or rejected a read or command.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Transport unreachable while running `{command}`: {reason}")]
    Unreachable { command: String, reason: String },

    #[error("Command `{command}` exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Malformed backend response: {reason}")]
    Malformed { reason: String },
}

/// The backend refused a configuration change.
#[derive(Debug, Error)]
pub enum MutationError {
    #[error("Mutation on {target} rejected: {reason}")]
    Rejected {
        target: MutationTarget,
        reason: String,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// A bounded polling loop ended without observing its condition.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("Condition not met within {deadline:?} after {attempts} attempts")]
    Timeout { deadline: Duration, attempts: u32 },

    #[error("Polling aborted: {0:#}")]
    Aborted(anyhow::Error),
}

impl PollError {
    /// Whether polling ran out of time rather than being aborted.
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// The background reporter could not be launched.
#[derive(Debug, Error)]
pub enum StartError {
    #[error("Failed to launch diagnostic command `{command}`: {source}")]
    Launch {
        command: String,
        #[source]
        source: TransportError,
    },
}

/// A scenario stopped before its last step completed.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Background reporter failed to start: {0}")]
    Reporter(#[from] StartError),

    #[error("Entities never reached an assigned state: {0}")]
    Precondition(#[source] PollError),

    #[error("Step `{step}` failed to apply its mutation: {source}")]
    Mutation {
        step: String,
        #[source]
        source: MutationError,
    },

    #[error("Step `{step}` did not converge: {source}")]
    Convergence {
        step: String,
        #[source]
        source: PollError,
    },

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid timeout: deadline {deadline_ms}ms and interval {interval_ms}ms must both be positive")]
    InvalidTimeout { deadline_ms: u128, interval_ms: u128 },

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("{0} command cannot be empty")]
    EmptyCommand(&'static str),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}
