//! Convergence Harness - mutate a distributed system and wait for it to settle
//!
//! The harness applies configuration changes to an external system, then
//! polls a snapshot of per-entity derived state until every entity reports a
//! value different from the one it had before the change. A background
//! diagnostic task runs for the whole scenario and is always released when
//! the scenario ends, successfully or not.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Models, errors and port traits
//! - **Service Layer** (`services`): Polling, convergence and scenario logic
//! - **Infrastructure Layer** (`infrastructure`): Shell/kubectl transports, clock, config, logging
//! - **Adapters** (`adapters`): Deterministic test doubles for every port
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use convergence_harness::{ConfigLoader, KubectlPreset, ScenarioDriver, SystemClock, TracingLogger};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load()?;
//!     let preset = KubectlPreset::new("default", "zgroup=testapp");
//!     let driver = ScenarioDriver::from_transport(
//!         Arc::new(preset.transport()),
//!         Arc::new(SystemClock),
//!         Arc::new(TracingLogger::new()),
//!         &config,
//!     )?;
//!     let report = driver.run(&preset.label_change_scenario()).await?;
//!     println!("{} entities converged", report.baseline.len());
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{
    ConfigError, MutationError, PollError, ScenarioError, StartError, TransportError,
};
pub use domain::models::{
    EntityId, HarnessConfig, Mutation, MutationScope, MutationTarget, PollOutcome, Scenario,
    ScenarioReport, ScenarioStep, StateSnapshot, StepReport, TimeoutSpec,
};
pub use domain::ports::{Clock, DiagnosticRunner, Logger, MutationApplier, SnapshotSource};
pub use infrastructure::config::ConfigLoader;
pub use infrastructure::logging::TracingLogger;
pub use infrastructure::{KubectlPreset, ShellTransport, SystemClock};
pub use services::{
    has_converged, BackgroundReporter, ConditionPoller, ReporterHandle, ScenarioDriver,
};
