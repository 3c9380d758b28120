//! Scenario orchestration: mutate, then poll until converged, step by step.
//!
//! The driver threads the baseline snapshot explicitly from one step to the
//! next: each step consumes the previous baseline and returns the fresh
//! snapshot that satisfied the convergence check.

use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use super::background_reporter::{BackgroundReporter, ReporterHandle};
use super::condition_poller::ConditionPoller;
use super::convergence_checker::{has_converged, pending_entities};
use super::scoped_logger::ScopedLogger;
use crate::domain::errors::{ConfigError, ScenarioError};
use crate::domain::models::{
    HarnessConfig, PollOutcome, ReporterPolicy, Scenario, ScenarioReport, ScenarioStep,
    StateSnapshot, StepReport, TimeoutSpec,
};
use crate::domain::ports::{
    Clock, DiagnosticRunner, Level, LogFields, Logger, MutationApplier, SnapshotSource,
};

/// Settings the driver needs from [`HarnessConfig`], already validated.
#[derive(Debug, Clone)]
pub struct DriverSettings {
    /// Default convergence timeout for steps without an override.
    pub poll: TimeoutSpec,
    /// Timeout for the initial "every entity has a state" wait.
    pub precondition: TimeoutSpec,
    /// Diagnostic command run in the background for the whole scenario.
    pub reporter_command: String,
    /// What to do when the reporter fails to launch.
    pub reporter_policy: ReporterPolicy,
    /// Commands captured once when a step fails.
    pub failure_report: Vec<String>,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            poll: TimeoutSpec::default(),
            precondition: TimeoutSpec::default(),
            reporter_command: "uptime".to_string(),
            reporter_policy: ReporterPolicy::Required,
            failure_report: Vec::new(),
        }
    }
}

impl TryFrom<&HarnessConfig> for DriverSettings {
    type Error = ConfigError;

    fn try_from(config: &HarnessConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            poll: config.poll.to_spec()?,
            precondition: config.precondition.to_spec()?,
            reporter_command: config.reporter.command.clone(),
            reporter_policy: config.reporter.policy,
            failure_report: config.failure_report.clone(),
        })
    }
}

/// Runs convergence scenarios against the external system.
pub struct ScenarioDriver {
    source: Arc<dyn SnapshotSource>,
    applier: Arc<dyn MutationApplier>,
    reporter: BackgroundReporter,
    poller: ConditionPoller,
    clock: Arc<dyn Clock>,
    logger: Arc<dyn Logger>,
    settings: DriverSettings,
}

impl ScenarioDriver {
    /// Wire a driver from its collaborators.
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        applier: Arc<dyn MutationApplier>,
        reporter: BackgroundReporter,
        clock: Arc<dyn Clock>,
        logger: Arc<dyn Logger>,
        settings: DriverSettings,
    ) -> Self {
        Self {
            source,
            applier,
            reporter,
            poller: ConditionPoller::new(Arc::clone(&clock)),
            clock,
            logger,
            settings,
        }
    }

    /// Convenience constructor for transports that implement every port.
    pub fn from_transport<T>(
        transport: Arc<T>,
        clock: Arc<dyn Clock>,
        logger: Arc<dyn Logger>,
        config: &HarnessConfig,
    ) -> Result<Self, ConfigError>
    where
        T: SnapshotSource + MutationApplier + DiagnosticRunner + 'static,
    {
        let settings = DriverSettings::try_from(config)?;
        let reporter = BackgroundReporter::with_interval(
            transport.clone(),
            Arc::clone(&logger),
            config.reporter.interval(),
        )?;
        Ok(Self::new(
            transport.clone(),
            transport,
            reporter,
            clock,
            logger,
            settings,
        ))
    }

    /// Run every step of `scenario` in order.
    ///
    /// Step timeouts are validated before anything touches the backend. The
    /// background reporter is started before the first step and cancelled
    /// after the last one or as soon as a step fails. On failure the
    /// configured failure diagnostics are captured before the error is
    /// returned. Every record logged during the run carries its `run_id`.
    pub async fn run(&self, scenario: &Scenario) -> Result<ScenarioReport, ScenarioError> {
        for step in &scenario.steps {
            self.step_timeout(step)?;
        }

        let run_id = Uuid::new_v4();
        let logger: Arc<dyn Logger> = Arc::new(ScopedLogger::new(
            Arc::clone(&self.logger),
            [("run_id", json!(run_id))],
        ));
        let reporter = self.reporter.with_logger(Arc::clone(&logger));
        let handle = self.start_reporter(&reporter, logger.as_ref()).await?;

        log(
            logger.as_ref(),
            Level::Info,
            "Scenario started",
            [
                ("scenario", json!(scenario.name)),
                ("steps", json!(scenario.steps.len())),
            ],
        )
        .await;

        let result = self.run_steps(run_id, scenario, logger.as_ref()).await;
        handle.cancel();

        match &result {
            Ok(report) => {
                log(
                    logger.as_ref(),
                    Level::Info,
                    "Scenario converged",
                    [
                        ("scenario", json!(scenario.name)),
                        ("entities", json!(report.baseline.len())),
                    ],
                )
                .await;
            }
            Err(e) => {
                log(
                    logger.as_ref(),
                    Level::Error,
                    "Scenario failed",
                    [
                        ("scenario", json!(scenario.name)),
                        ("error", json!(e.to_string())),
                    ],
                )
                .await;
                reporter.capture(&self.settings.failure_report).await;
            }
        }

        result
    }

    /// Wait until the fleet selected by `scenario` is fully assigned and
    /// return that snapshot as the first baseline.
    pub async fn await_baseline(&self, scenario: &Scenario) -> Result<StateSnapshot, ScenarioError> {
        self.wait_for_baseline(scenario, self.logger.as_ref()).await
    }

    /// Apply `step`'s mutation against `before` and wait for convergence.
    ///
    /// Returns the fresh snapshot, which becomes the next step's baseline.
    pub async fn execute_step(
        &self,
        scenario: &Scenario,
        step: &ScenarioStep,
        before: &StateSnapshot,
    ) -> Result<StateSnapshot, ScenarioError> {
        self.converge_step(scenario, step, before, self.logger.as_ref())
            .await
    }

    fn step_timeout(&self, step: &ScenarioStep) -> Result<TimeoutSpec, ScenarioError> {
        match step.timeout {
            Some(settings) => Ok(settings.to_spec()?),
            None => Ok(self.settings.poll),
        }
    }

    async fn wait_for_baseline(
        &self,
        scenario: &Scenario,
        logger: &dyn Logger,
    ) -> Result<StateSnapshot, ScenarioError> {
        self.poller
            .poll(&self.settings.precondition, || async {
                match self.source.fetch_snapshot(&scenario.selector).await {
                    Ok(snapshot) if is_ready(&snapshot, scenario) => {
                        PollOutcome::Converged(snapshot)
                    }
                    Ok(snapshot) => {
                        let unassigned: Vec<String> =
                            snapshot.unassigned().iter().map(ToString::to_string).collect();
                        log(
                            logger,
                            Level::Debug,
                            "Found entities without a state",
                            [
                                ("entities", json!(snapshot.len())),
                                ("unassigned", json!(unassigned)),
                            ],
                        )
                        .await;
                        PollOutcome::NotYetConverged
                    }
                    Err(e) => PollOutcome::HardError(
                        anyhow::Error::new(e).context("fetching initial snapshot"),
                    ),
                }
            })
            .await
            .map_err(ScenarioError::Precondition)
    }

    async fn converge_step(
        &self,
        scenario: &Scenario,
        step: &ScenarioStep,
        before: &StateSnapshot,
        logger: &dyn Logger,
    ) -> Result<StateSnapshot, ScenarioError> {
        let spec = self.step_timeout(step)?;

        for target in step.mutation.targets(before) {
            self.applier
                .apply_mutation(&target, &step.mutation.change)
                .await
                .map_err(|source| ScenarioError::Mutation {
                    step: step.name.clone(),
                    source,
                })?;
        }

        self.poller
            .poll(&spec, || async {
                match self.source.fetch_snapshot(&scenario.selector).await {
                    Ok(fresh) if has_converged(before, &fresh) => PollOutcome::Converged(fresh),
                    Ok(fresh) => {
                        for pending in pending_entities(before, &fresh) {
                            log(
                                logger,
                                Level::Debug,
                                "Entity state not converged",
                                [
                                    ("step", json!(step.name)),
                                    ("entity", json!(pending.entity)),
                                    ("previous", json!(before.get(&pending.entity))),
                                    ("pending", json!(pending.reason)),
                                ],
                            )
                            .await;
                        }
                        PollOutcome::NotYetConverged
                    }
                    Err(e) => PollOutcome::HardError(
                        anyhow::Error::new(e).context("fetching snapshot during convergence"),
                    ),
                }
            })
            .await
            .map_err(|source| ScenarioError::Convergence {
                step: step.name.clone(),
                source,
            })
    }

    async fn run_steps(
        &self,
        run_id: Uuid,
        scenario: &Scenario,
        logger: &dyn Logger,
    ) -> Result<ScenarioReport, ScenarioError> {
        let mut baseline = self.wait_for_baseline(scenario, logger).await?;
        let mut steps = Vec::with_capacity(scenario.steps.len());

        for step in &scenario.steps {
            log(
                logger,
                Level::Info,
                "Step started",
                [
                    ("step", json!(step.name)),
                    ("entities", json!(baseline.len())),
                ],
            )
            .await;

            let started = self.clock.now();
            baseline = self.converge_step(scenario, step, &baseline, logger).await?;
            let elapsed = self.clock.now().saturating_duration_since(started);

            log(
                logger,
                Level::Info,
                "Step converged",
                [
                    ("step", json!(step.name)),
                    ("elapsed_ms", json!(elapsed.as_millis())),
                ],
            )
            .await;

            steps.push(StepReport {
                name: step.name.clone(),
                elapsed,
                baseline: baseline.clone(),
            });
        }

        Ok(ScenarioReport {
            scenario: scenario.name.clone(),
            run_id,
            steps,
            baseline,
        })
    }

    async fn start_reporter(
        &self,
        reporter: &BackgroundReporter,
        logger: &dyn Logger,
    ) -> Result<ReporterHandle, ScenarioError> {
        match reporter.start(&self.settings.reporter_command).await {
            Ok(handle) => Ok(handle),
            Err(e) if self.settings.reporter_policy == ReporterPolicy::BestEffort => {
                log(
                    logger,
                    Level::Warn,
                    "Background reporter unavailable, continuing without diagnostics",
                    [("error", json!(e.to_string()))],
                )
                .await;
                Ok(ReporterHandle::detached())
            }
            Err(e) => Err(ScenarioError::Reporter(e)),
        }
    }
}

async fn log<const N: usize>(
    logger: &dyn Logger,
    level: Level,
    message: &str,
    fields: [(&str, serde_json::Value); N],
) {
    let fields: LogFields = fields
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect();
    logger.log(level, message, fields).await;
}

fn is_ready(snapshot: &StateSnapshot, scenario: &Scenario) -> bool {
    snapshot.is_fully_assigned()
        && scenario
            .expected_entities
            .iter()
            .all(|id| snapshot.contains(id))
}
