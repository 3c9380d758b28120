//! Scenario definitions: an ordered list of mutations, each followed by a
//! convergence wait.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

use super::config::PollSettings;
use super::snapshot::{EntityId, StateSnapshot};

/// Which entities a mutation is applied to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "name")]
pub enum MutationScope {
    /// Apply the change once per entity of the current baseline.
    EachTracked,
    /// Apply the change once against a named group (e.g. a namespace).
    Scope(String),
}

/// Resolved target handed to the transport for a single mutation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationTarget {
    /// One tracked entity.
    Entity(EntityId),
    /// A named group of entities.
    Scope(String),
}

impl fmt::Display for MutationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entity(id) => write!(f, "entity/{id}"),
            Self::Scope(name) => write!(f, "scope/{name}"),
        }
    }
}

/// Configuration change applied through the external collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mutation {
    /// Entities the change applies to.
    pub scope: MutationScope,
    /// Opaque change description; the shell transport treats it as a
    /// command template with `{entity}` and `{scope}` placeholders.
    pub change: String,
}

impl Mutation {
    /// Mutation applied to every tracked entity.
    pub fn each_tracked(change: impl Into<String>) -> Self {
        Self {
            scope: MutationScope::EachTracked,
            change: change.into(),
        }
    }

    /// Mutation applied once to a named scope.
    pub fn scoped(scope: impl Into<String>, change: impl Into<String>) -> Self {
        Self {
            scope: MutationScope::Scope(scope.into()),
            change: change.into(),
        }
    }

    /// Expand the scope into concrete targets against `baseline`.
    pub fn targets(&self, baseline: &StateSnapshot) -> Vec<MutationTarget> {
        match &self.scope {
            MutationScope::EachTracked => baseline
                .entities()
                .cloned()
                .map(MutationTarget::Entity)
                .collect(),
            MutationScope::Scope(name) => vec![MutationTarget::Scope(name.clone())],
        }
    }
}

/// One mutate-then-converge step.
///
/// After `mutation` is accepted, every entity of the step's baseline must
/// report a new, non-empty state token before `timeout` runs out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioStep {
    /// Human-readable step name used in logs and reports.
    pub name: String,
    /// Change applied at the start of the step.
    pub mutation: Mutation,
    /// Per-step override of the convergence poll settings.
    #[serde(default)]
    pub timeout: Option<PollSettings>,
}

impl ScenarioStep {
    /// Create a step using the default convergence timeout.
    pub fn new(name: impl Into<String>, mutation: Mutation) -> Self {
        Self {
            name: name.into(),
            mutation,
            timeout: None,
        }
    }

    /// Override the convergence timeout of this step.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: PollSettings) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A complete convergence scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Selector passed to every snapshot fetch.
    pub selector: String,
    /// Entities that must be present before the first step runs.
    #[serde(default)]
    pub expected_entities: Vec<EntityId>,
    /// Steps executed in order.
    pub steps: Vec<ScenarioStep>,
}

impl Scenario {
    /// Create an empty scenario over `selector`.
    pub fn new(name: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            selector: selector.into(),
            expected_entities: Vec::new(),
            steps: Vec::new(),
        }
    }

    /// Append a step.
    #[must_use]
    pub fn step(mut self, step: ScenarioStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Require `ids` to be present in the initial snapshot.
    #[must_use]
    pub fn expect_entities<I, K>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<EntityId>,
    {
        self.expected_entities.extend(ids.into_iter().map(Into::into));
        self
    }
}

/// Outcome of one successful step.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    /// Step name.
    pub name: String,
    /// Time spent between applying the mutation and observing convergence.
    pub elapsed: Duration,
    /// Snapshot that became the baseline for the next step.
    pub baseline: StateSnapshot,
}

/// Outcome of a successful scenario run.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    /// Scenario name.
    pub scenario: String,
    /// Identifier attached to every log record of this run.
    pub run_id: Uuid,
    /// Per-step reports in execution order.
    pub steps: Vec<StepReport>,
    /// Baseline after the last step.
    pub baseline: StateSnapshot,
}
