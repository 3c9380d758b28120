//! Domain layer for the convergence harness
//!
//! This module contains the scenario and snapshot models, the error taxonomy
//! and the port traits implemented by infrastructure adapters.

pub mod errors;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use errors::{
    ConfigError, MutationError, PollError, ScenarioError, StartError, TransportError,
};
