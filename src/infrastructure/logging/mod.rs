//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - JSON or pretty stdout formatting
//! - Optional daily-rolling JSON log files
//! - A `Logger` port adapter that forwards records to tracing

pub mod logger;
pub mod tracing_logger;

pub use logger::LoggerImpl;
pub use tracing_logger::TracingLogger;
