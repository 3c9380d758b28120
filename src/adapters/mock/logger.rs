//! Logger that keeps records in memory for assertions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::ports::{Level, LogFields, Logger};

/// One captured log record.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub level: Level,
    pub message: String,
    pub fields: LogFields,
    pub timestamp: DateTime<Utc>,
}

/// In-memory [`Logger`].
#[derive(Debug, Default)]
pub struct MemoryLogger {
    records: Mutex<Vec<LogRecord>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records captured so far.
    pub async fn records(&self) -> Vec<LogRecord> {
        self.records.lock().await.clone()
    }

    /// Records logged at exactly `level`.
    pub async fn records_at(&self, level: Level) -> Vec<LogRecord> {
        self.records
            .lock()
            .await
            .iter()
            .filter(|record| record.level == level)
            .cloned()
            .collect()
    }

    /// Records whose message equals `message`.
    pub async fn with_message(&self, message: &str) -> Vec<LogRecord> {
        self.records
            .lock()
            .await
            .iter()
            .filter(|record| record.message == message)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Logger for MemoryLogger {
    async fn log(&self, level: Level, message: &str, fields: LogFields) {
        self.records.lock().await.push(LogRecord {
            level,
            message: message.to_string(),
            fields,
            timestamp: Utc::now(),
        });
    }
}
