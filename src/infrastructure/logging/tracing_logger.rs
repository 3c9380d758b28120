use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::ports::{Level, LogFields, Logger};

/// [`Logger`] adapter that emits every record as a `tracing` event.
///
/// Structured fields are rendered as one JSON object under the `fields` key
/// so JSON log output keeps them machine-readable.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl TracingLogger {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Logger for TracingLogger {
    async fn log(&self, level: Level, message: &str, fields: LogFields) {
        let fields = render_fields(fields);
        match level {
            Level::Trace => tracing::trace!(fields = %fields, "{message}"),
            Level::Debug => tracing::debug!(fields = %fields, "{message}"),
            Level::Info => tracing::info!(fields = %fields, "{message}"),
            Level::Warn => tracing::warn!(fields = %fields, "{message}"),
            Level::Error => tracing::error!(fields = %fields, "{message}"),
        }
    }
}

fn render_fields(fields: LogFields) -> Value {
    let mut entries: Vec<(String, Value)> = fields.into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Value::Object(entries.into_iter().collect::<Map<String, Value>>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_fields_is_object() {
        let mut fields = LogFields::new();
        fields.insert("step".to_string(), json!("add label"));
        fields.insert("entity".to_string(), json!("pod1"));

        let rendered = render_fields(fields);
        assert_eq!(rendered.to_string(), r#"{"entity":"pod1","step":"add label"}"#);
    }

    #[tokio::test]
    async fn test_log_without_subscriber_is_noop() {
        TracingLogger::new().info("nothing listening").await;
    }
}
