//! Scripted backend implementing every transport port.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use tokio::sync::Mutex;

use crate::domain::errors::{MutationError, TransportError};
use crate::domain::models::{MutationTarget, StateSnapshot};
use crate::domain::ports::{DiagnosticRunner, MutationApplier, SnapshotSource};

#[derive(Debug, Clone)]
enum ScriptedFetch {
    Snapshot(StateSnapshot),
    Unreachable(String),
}

/// In-memory stand-in for the system under test.
///
/// Snapshot fetches are served from a queue; the last entry is repeated once
/// the queue is down to one element, so a script can end in a steady state.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    fetches: Mutex<VecDeque<ScriptedFetch>>,
    snapshot_fetches: AtomicU32,
    applied: Mutex<Vec<(MutationTarget, String)>>,
    reject_mutations: AtomicBool,
    diagnostic_output: Mutex<String>,
    fail_diagnostics: AtomicBool,
    diagnostic_invocations: AtomicU32,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue snapshots to be returned by successive fetches.
    pub async fn push_snapshots<I>(&self, snapshots: I)
    where
        I: IntoIterator<Item = StateSnapshot>,
    {
        let mut fetches = self.fetches.lock().await;
        fetches.extend(snapshots.into_iter().map(ScriptedFetch::Snapshot));
    }

    /// Queue a fetch that fails as if the backend were unreachable.
    pub async fn push_unreachable(&self, reason: impl Into<String>) {
        let mut fetches = self.fetches.lock().await;
        fetches.push_back(ScriptedFetch::Unreachable(reason.into()));
    }

    /// Number of snapshot fetches served so far.
    pub fn snapshot_fetches(&self) -> u32 {
        self.snapshot_fetches.load(Ordering::SeqCst)
    }

    /// Reject every subsequent mutation.
    pub fn reject_mutations(&self, reject: bool) {
        self.reject_mutations.store(reject, Ordering::SeqCst);
    }

    /// Mutations accepted so far, in order.
    pub async fn applied_mutations(&self) -> Vec<(MutationTarget, String)> {
        self.applied.lock().await.clone()
    }

    /// Output returned by every diagnostic invocation.
    pub async fn set_diagnostic_output(&self, output: impl Into<String>) {
        *self.diagnostic_output.lock().await = output.into();
    }

    /// Make diagnostic invocations fail.
    pub fn fail_diagnostics(&self, fail: bool) {
        self.fail_diagnostics.store(fail, Ordering::SeqCst);
    }

    /// Number of diagnostic invocations, successful or not.
    pub fn diagnostic_invocations(&self) -> u32 {
        self.diagnostic_invocations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotSource for ScriptedBackend {
    async fn fetch_snapshot(&self, selector: &str) -> Result<StateSnapshot, TransportError> {
        self.snapshot_fetches.fetch_add(1, Ordering::SeqCst);

        let mut fetches = self.fetches.lock().await;
        let next = if fetches.len() > 1 {
            fetches.pop_front()
        } else {
            fetches.front().cloned()
        };

        match next {
            Some(ScriptedFetch::Snapshot(snapshot)) => Ok(snapshot),
            Some(ScriptedFetch::Unreachable(reason)) => Err(TransportError::Unreachable {
                command: format!("fetch {selector}"),
                reason,
            }),
            None => Err(TransportError::Unreachable {
                command: format!("fetch {selector}"),
                reason: "no snapshot scripted".to_string(),
            }),
        }
    }
}

#[async_trait]
impl MutationApplier for ScriptedBackend {
    async fn apply_mutation(
        &self,
        target: &MutationTarget,
        change: &str,
    ) -> Result<(), MutationError> {
        if self.reject_mutations.load(Ordering::SeqCst) {
            return Err(MutationError::Rejected {
                target: target.clone(),
                reason: "rejected by scripted backend".to_string(),
            });
        }
        self.applied
            .lock()
            .await
            .push((target.clone(), change.to_string()));
        Ok(())
    }
}

#[async_trait]
impl DiagnosticRunner for ScriptedBackend {
    async fn run_diagnostic(&self, command: &str) -> Result<String, TransportError> {
        self.diagnostic_invocations.fetch_add(1, Ordering::SeqCst);
        if self.fail_diagnostics.load(Ordering::SeqCst) {
            return Err(TransportError::CommandFailed {
                command: command.to_string(),
                status: "exit status: 1".to_string(),
                stderr: "scripted diagnostic failure".to_string(),
            });
        }
        Ok(self.diagnostic_output.lock().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_last_snapshot_is_sticky() {
        let backend = ScriptedBackend::new();
        backend
            .push_snapshots([
                StateSnapshot::from_pairs([("pod1", "a")]),
                StateSnapshot::from_pairs([("pod1", "b")]),
            ])
            .await;

        let first = backend.fetch_snapshot("all").await.expect("fetch");
        let second = backend.fetch_snapshot("all").await.expect("fetch");
        let third = backend.fetch_snapshot("all").await.expect("fetch");

        assert_eq!(first.get(&"pod1".into()), Some("a"));
        assert_eq!(second, third);
        assert_eq!(backend.snapshot_fetches(), 3);
    }

    #[tokio::test]
    async fn test_empty_script_is_unreachable() {
        let backend = ScriptedBackend::new();
        let result = backend.fetch_snapshot("all").await;
        assert!(matches!(result, Err(TransportError::Unreachable { .. })));
    }
}
