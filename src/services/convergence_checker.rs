//! Snapshot comparison deciding whether a fleet has converged.
//!
//! Convergence means every entity of the previous snapshot is still present
//! and now carries a different, non-empty state token. Entities that only
//! appear in the newer snapshot are ignored, so fleet growth never blocks
//! convergence of the entities that were already tracked.

use serde::Serialize;

use crate::domain::models::{EntityId, StateSnapshot};

/// Why a previously tracked entity does not count as converged yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum PendingReason {
    /// The entity is absent from the current snapshot.
    Missing,
    /// The entity has no state token assigned.
    Unassigned,
    /// The entity still carries its previous token.
    Unchanged {
        /// Token seen in both snapshots.
        token: String,
    },
}

/// A previously tracked entity that has not converged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingEntity {
    /// Entity id.
    pub entity: EntityId,
    /// Why it is still pending.
    #[serde(flatten)]
    pub reason: PendingReason,
}

/// Returns `true` iff every entity of `previous` has a new, non-empty token in `current`.
pub fn has_converged(previous: &StateSnapshot, current: &StateSnapshot) -> bool {
    previous
        .iter()
        .all(|(id, before)| pending_reason(before, current.get(id)).is_none())
}

/// Entities of `previous` that block convergence, in id order.
pub fn pending_entities(previous: &StateSnapshot, current: &StateSnapshot) -> Vec<PendingEntity> {
    previous
        .iter()
        .filter_map(|(id, before)| {
            pending_reason(before, current.get(id)).map(|reason| PendingEntity {
                entity: id.clone(),
                reason,
            })
        })
        .collect()
}

fn pending_reason(before: &str, now: Option<&str>) -> Option<PendingReason> {
    match now {
        None => Some(PendingReason::Missing),
        Some("") => Some(PendingReason::Unassigned),
        Some(token) if token == before => Some(PendingReason::Unchanged {
            token: token.to_string(),
        }),
        Some(_) => None,
    }
}
