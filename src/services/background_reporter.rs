//! Background diagnostic reporter.
//!
//! [`BackgroundReporter::start`] runs a diagnostic command once in the
//! foreground to prove the transport accepts it, then spawns a tokio task
//! that re-issues the command on every tick and logs its output until the
//! returned [`ReporterHandle`] is cancelled or dropped.

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::domain::errors::{ConfigError, StartError};
use crate::domain::ports::{DiagnosticRunner, Level, LogFields, Logger};

/// Launches diagnostic tasks that run alongside a scenario.
#[derive(Clone)]
pub struct BackgroundReporter {
    runner: Arc<dyn DiagnosticRunner>,
    logger: Arc<dyn Logger>,
    interval: Duration,
}

impl BackgroundReporter {
    /// Default wait between two diagnostic invocations.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(4);

    /// Create a reporter with the default interval.
    pub fn new(runner: Arc<dyn DiagnosticRunner>, logger: Arc<dyn Logger>) -> Self {
        Self {
            runner,
            logger,
            interval: Self::DEFAULT_INTERVAL,
        }
    }

    /// Create a reporter with a custom interval.
    ///
    /// The interval must be non-zero.
    pub fn with_interval(
        runner: Arc<dyn DiagnosticRunner>,
        logger: Arc<dyn Logger>,
        interval: Duration,
    ) -> Result<Self, ConfigError> {
        if interval.is_zero() {
            return Err(ConfigError::ValidationFailed(
                "reporter interval must be positive".to_string(),
            ));
        }
        Ok(Self {
            runner,
            logger,
            interval,
        })
    }

    /// Same reporter, logging through `logger`.
    #[must_use]
    pub fn with_logger(&self, logger: Arc<dyn Logger>) -> Self {
        Self {
            runner: Arc::clone(&self.runner),
            logger,
            interval: self.interval,
        }
    }

    /// Wait between two diagnostic invocations.
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Launch the diagnostic task for `command`.
    ///
    /// The first invocation happens before this returns; if it fails no task
    /// is spawned and [`StartError::Launch`] is returned.
    pub async fn start(&self, command: &str) -> Result<ReporterHandle, StartError> {
        let output = self
            .runner
            .run_diagnostic(command)
            .await
            .map_err(|source| StartError::Launch {
                command: command.to_string(),
                source,
            })?;
        log_output(self.logger.as_ref(), command, &output).await;

        let (cancel_tx, mut cancel_rx) = watch::channel(false);
        let runner = Arc::clone(&self.runner);
        let logger = Arc::clone(&self.logger);
        let interval = self.interval;
        let task_command = command.to_string();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);

            // Skip first tick (fires immediately); start already ran the command
            ticker.tick().await;

            loop {
                tokio::select! {
                    biased;

                    changed = cancel_rx.changed() => {
                        if changed.is_err() || *cancel_rx.borrow() {
                            break;
                        }
                    }

                    _ = ticker.tick() => {
                        if *cancel_rx.borrow() {
                            break;
                        }
                        match runner.run_diagnostic(&task_command).await {
                            Ok(output) => log_output(logger.as_ref(), &task_command, &output).await,
                            Err(e) => {
                                let mut fields = LogFields::new();
                                fields.insert("command".to_string(), json!(task_command));
                                fields.insert("error".to_string(), json!(e.to_string()));
                                logger
                                    .log(Level::Warn, "Diagnostic command failed", fields)
                                    .await;
                            }
                        }
                    }
                }
            }

            tracing::debug!(command = %task_command, "Background reporter stopped");
        });

        Ok(ReporterHandle {
            command: Some(command.to_string()),
            cancel_tx: Some(cancel_tx),
            task: Some(task),
        })
    }

    /// Run each of `commands` once and log the output.
    ///
    /// Used to capture state after a failure; individual command failures
    /// are logged and do not stop the remaining commands.
    pub async fn capture(&self, commands: &[String]) {
        for command in commands {
            match self.runner.run_diagnostic(command).await {
                Ok(output) => log_output(self.logger.as_ref(), command, &output).await,
                Err(e) => {
                    let mut fields = LogFields::new();
                    fields.insert("command".to_string(), json!(command));
                    fields.insert("error".to_string(), json!(e.to_string()));
                    self.logger
                        .log(Level::Warn, "Failure diagnostic command failed", fields)
                        .await;
                }
            }
        }
    }
}

async fn log_output(logger: &dyn Logger, command: &str, output: &str) {
    let mut fields = LogFields::new();
    fields.insert("command".to_string(), json!(command));
    fields.insert("output".to_string(), json!(output.trim_end()));
    logger.log(Level::Info, "Diagnostic output", fields).await;
}

/// Owns the lifecycle of one background diagnostic task.
///
/// Cancelling is idempotent and never blocks. Dropping the handle cancels
/// the task, so a handle held for the duration of a scenario is released on
/// every exit path.
#[derive(Debug, Default)]
pub struct ReporterHandle {
    command: Option<String>,
    cancel_tx: Option<watch::Sender<bool>>,
    task: Option<JoinHandle<()>>,
}

impl ReporterHandle {
    /// A handle with no task behind it, for runs where the reporter did not start.
    pub fn detached() -> Self {
        Self::default()
    }

    /// Command the task is reporting on, if a task was started.
    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }

    /// Stop the diagnostic task.
    ///
    /// No new diagnostic invocation starts once this returns. An invocation
    /// already in flight is aborted at its next suspension point.
    pub fn cancel(&self) {
        if let Some(tx) = &self.cancel_tx {
            tx.send_replace(true);
        }
        if let Some(task) = &self.task {
            task.abort();
        }
    }

    /// Whether `cancel` has been called (or no task was ever started).
    pub fn is_cancelled(&self) -> bool {
        self.cancel_tx.as_ref().is_none_or(|tx| *tx.borrow())
    }

    /// Whether the diagnostic task is still running.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for ReporterHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
