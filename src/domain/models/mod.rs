//! Domain models for convergence scenarios.

pub mod config;
pub mod polling;
pub mod scenario;
pub mod snapshot;

pub use config::{HarnessConfig, LoggingConfig, PollSettings, ReporterConfig, ReporterPolicy};
pub use polling::{PollOutcome, TimeoutSpec};
pub use scenario::{
    Mutation, MutationScope, MutationTarget, Scenario, ScenarioReport, ScenarioStep, StepReport,
};
pub use snapshot::{EntityId, StateSnapshot};
