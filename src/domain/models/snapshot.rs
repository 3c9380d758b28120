//! Point-in-time view of the tracked fleet.
//!
//! A [`StateSnapshot`] maps every tracked entity to the opaque state token the
//! external system reported for it at capture time. Snapshots are never
//! updated in place; every fetch produces a new value and the previous one is
//! simply dropped once the scenario moves on.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Stable identifier of a tracked entity (for example a pod name).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Create a new entity identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Immutable mapping from [`EntityId`] to state token.
///
/// An empty token means the external system has not assigned a state to the
/// entity yet. Iteration order is sorted by id so log output is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateSnapshot {
    tokens: BTreeMap<EntityId, String>,
}

impl StateSnapshot {
    /// Snapshot with no entities.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a snapshot from `(id, token)` pairs. Later pairs win on duplicate ids.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<EntityId>,
        V: Into<String>,
    {
        Self {
            tokens: pairs
                .into_iter()
                .map(|(id, token)| (id.into(), token.into()))
                .collect(),
        }
    }

    /// Token recorded for `id`, if the entity is present.
    pub fn get(&self, id: &EntityId) -> Option<&str> {
        self.tokens.get(id).map(String::as_str)
    }

    /// Whether `id` is present in this snapshot.
    pub fn contains(&self, id: &EntityId) -> bool {
        self.tokens.contains_key(id)
    }

    /// Tracked entity ids in sorted order.
    pub fn entities(&self) -> impl Iterator<Item = &EntityId> {
        self.tokens.keys()
    }

    /// `(id, token)` pairs in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, &str)> {
        self.tokens.iter().map(|(id, token)| (id, token.as_str()))
    }

    /// Number of tracked entities.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the snapshot tracks no entity at all.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Entities whose state token has not been assigned yet.
    pub fn unassigned(&self) -> Vec<&EntityId> {
        self.tokens
            .iter()
            .filter(|(_, token)| token.is_empty())
            .map(|(id, _)| id)
            .collect()
    }

    /// True when at least one entity is tracked and none has an empty token.
    pub fn is_fully_assigned(&self) -> bool {
        !self.is_empty() && self.tokens.values().all(|token| !token.is_empty())
    }
}

impl<K, V> FromIterator<(K, V)> for StateSnapshot
where
    K: Into<EntityId>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self::from_pairs(iter)
    }
}
