//! Capabilities consumed from the system under test.
//!
//! The harness never talks to the backend itself; it goes through these
//! three ports. Each is used sequentially by one task at a time, so
//! implementations need no internal request serialization beyond `Sync`.

use async_trait::async_trait;

use crate::domain::errors::{MutationError, TransportError};
use crate::domain::models::{MutationTarget, StateSnapshot};

/// Reads the derived state of the tracked fleet.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Capture a fresh snapshot of every entity matching `selector`.
    async fn fetch_snapshot(&self, selector: &str) -> Result<StateSnapshot, TransportError>;
}

/// Applies configuration changes.
#[async_trait]
pub trait MutationApplier: Send + Sync {
    /// Apply `change` to `target`.
    ///
    /// Returns once the backend has accepted the change; propagation to the
    /// entities' derived state may still be pending.
    async fn apply_mutation(
        &self,
        target: &MutationTarget,
        change: &str,
    ) -> Result<(), MutationError>;
}

/// Runs diagnostic commands for the background reporter.
#[async_trait]
pub trait DiagnosticRunner: Send + Sync {
    /// Run `command` once and return its captured output.
    async fn run_diagnostic(&self, command: &str) -> Result<String, TransportError>;
}
