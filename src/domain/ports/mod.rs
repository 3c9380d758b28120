//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the async interfaces infrastructure adapters implement:
//! - SnapshotSource / MutationApplier / DiagnosticRunner: the system under test
//! - Clock: monotonic time and sleeping for the condition poller
//! - Logger: structured logging injected into services
//!
//! These traits keep the polling and scenario logic independent of any
//! concrete transport.

pub mod clock;
pub mod logger;
pub mod transport;

pub use clock::Clock;
pub use logger::{Level, LogFields, Logger};
pub use transport::{DiagnosticRunner, MutationApplier, SnapshotSource};
