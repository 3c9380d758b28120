use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

/// Log level enumeration for structured logging
///
/// Levels are ordered from most verbose (Trace) to most severe (Error).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Detailed trace information
    Trace,
    /// Per-attempt polling details
    Debug,
    /// Scenario progress and diagnostic output
    Info,
    /// Degraded but continuing (e.g. reporter disabled)
    Warn,
    /// Step or scenario failure
    Error,
}

impl Level {
    /// Returns the string representation of the log level
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

/// Structured fields attached to a log record.
pub type LogFields = HashMap<String, Value>;

/// Port trait for structured logging
///
/// The scenario driver and the background reporter receive a logger at
/// construction time instead of writing to a process-wide logger. Adapters
/// decide where records go: [`TracingLogger`](crate::infrastructure::logging::TracingLogger)
/// forwards them to `tracing`, [`MemoryLogger`](crate::adapters::mock::MemoryLogger)
/// keeps them for assertions.
///
/// Implementations must be `Send + Sync`; the reporter task logs from its own
/// tokio task while the driver keeps logging from the step sequence.
///
/// # Examples
///
/// ```ignore
/// use convergence_harness::domain::ports::{Level, Logger};
/// use serde_json::json;
///
/// async fn report(logger: &dyn Logger, pod: &str) {
///     let mut fields = std::collections::HashMap::new();
///     fields.insert("entity".to_string(), json!(pod));
///     logger.log(Level::Debug, "Entity state unchanged", fields).await;
/// }
/// ```
#[async_trait]
pub trait Logger: Send + Sync {
    /// Log a message with a specific level and structured fields
    ///
    /// Common field conventions:
    /// - `run_id`: identifier of the scenario run
    /// - `step`: name of the current step
    /// - `entity`: tracked entity id
    /// - `command`: diagnostic command
    /// - `error`: error details for error-level logs
    async fn log(&self, level: Level, message: &str, fields: LogFields);

    /// Log a debug-level message
    async fn debug(&self, message: &str) {
        self.log(Level::Debug, message, LogFields::new()).await;
    }

    /// Log an info-level message
    async fn info(&self, message: &str) {
        self.log(Level::Info, message, LogFields::new()).await;
    }

    /// Log a warning-level message
    async fn warn(&self, message: &str) {
        self.log(Level::Warn, message, LogFields::new()).await;
    }

    /// Log an error-level message
    async fn error(&self, message: &str) {
        self.log(Level::Error, message, LogFields::new()).await;
    }
}
