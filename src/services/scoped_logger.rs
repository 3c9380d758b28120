//! Logger decorator that stamps fixed fields on every record.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::domain::ports::{Level, LogFields, Logger};

/// Forwards to an inner [`Logger`], adding `fields` to each record.
///
/// Fields already present on a record win over the scoped ones.
pub struct ScopedLogger {
    inner: Arc<dyn Logger>,
    fields: LogFields,
}

impl ScopedLogger {
    pub fn new<I, K>(inner: Arc<dyn Logger>, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self {
            inner,
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[async_trait]
impl Logger for ScopedLogger {
    async fn log(&self, level: Level, message: &str, mut fields: LogFields) {
        for (key, value) in &self.fields {
            fields
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
        self.inner.log(level, message, fields).await;
    }
}
