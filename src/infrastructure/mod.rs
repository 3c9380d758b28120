//! Infrastructure layer module
//!
//! Concrete adapters for the domain ports:
//! - Shell-command transport reaching the system under test
//! - kubectl preset for the label-change scenario
//! - System clock
//! - Configuration management
//! - Logging infrastructure

pub mod clock;
pub mod config;
pub mod kubectl;
pub mod logging;
pub mod shell;

pub use clock::SystemClock;
pub use kubectl::KubectlPreset;
pub use shell::ShellTransport;
