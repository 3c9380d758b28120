//! Adapters for external systems.

pub mod mock;
