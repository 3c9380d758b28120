//! Deterministic test doubles for the harness ports.
//!
//! These are public so integration tests and downstream test runners can
//! drive the scenario core without a live backend.

mod backend;
mod clock;
mod logger;

pub use backend::ScriptedBackend;
pub use clock::ManualClock;
pub use logger::{LogRecord, MemoryLogger};
