//! Common test utilities for integration tests
//!
//! Provides shared fixtures for driving the harness against the scripted
//! backend with a virtual clock.

use std::sync::Arc;
use std::time::Duration;

use convergence_harness::adapters::mock::{ManualClock, MemoryLogger, ScriptedBackend};
use convergence_harness::domain::models::ReporterPolicy;
use convergence_harness::services::DriverSettings;
use convergence_harness::{BackgroundReporter, ScenarioDriver, StateSnapshot, TimeoutSpec};

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
#[allow(dead_code)]
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Build a snapshot from `(entity, token)` pairs.
#[allow(dead_code)]
pub fn snapshot(pairs: &[(&str, &str)]) -> StateSnapshot {
    StateSnapshot::from_pairs(pairs.iter().copied())
}

/// Scripted backend, virtual clock and memory logger wired into a driver.
#[allow(dead_code)]
pub struct Harness {
    pub backend: Arc<ScriptedBackend>,
    pub clock: Arc<ManualClock>,
    pub logger: Arc<MemoryLogger>,
    pub settings: DriverSettings,
    pub reporter_interval: Duration,
}

#[allow(dead_code)]
impl Harness {
    pub fn new() -> Self {
        Self {
            backend: Arc::new(ScriptedBackend::new()),
            clock: Arc::new(ManualClock::new()),
            logger: Arc::new(MemoryLogger::new()),
            settings: DriverSettings::default(),
            reporter_interval: Duration::from_millis(10),
        }
    }

    pub fn with_poll(mut self, deadline_secs: u64, interval_secs: u64) -> Self {
        let spec = TimeoutSpec::from_secs(deadline_secs, interval_secs).expect("valid spec");
        self.settings.poll = spec;
        self.settings.precondition = spec;
        self
    }

    pub fn with_policy(mut self, policy: ReporterPolicy) -> Self {
        self.settings.reporter_policy = policy;
        self
    }

    pub fn with_failure_report(mut self, commands: &[&str]) -> Self {
        self.settings.failure_report = commands.iter().map(ToString::to_string).collect();
        self
    }

    pub fn reporter(&self) -> BackgroundReporter {
        BackgroundReporter::with_interval(
            self.backend.clone(),
            self.logger.clone(),
            self.reporter_interval,
        )
        .expect("valid reporter interval")
    }

    pub fn driver(&self) -> ScenarioDriver {
        ScenarioDriver::new(
            self.backend.clone(),
            self.backend.clone(),
            self.reporter(),
            self.clock.clone(),
            self.logger.clone(),
            self.settings.clone(),
        )
    }
}
