//! CLI command implementations.

pub mod config;
pub mod label_changes;
pub mod run;

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{HarnessConfig, Scenario, ScenarioReport, StateSnapshot};
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::logging::{LoggerImpl, TracingLogger};
use crate::infrastructure::{ShellTransport, SystemClock};
use crate::services::ScenarioDriver;

/// Load the configuration from `path`, or from the default locations.
pub fn load_config(path: Option<&Path>) -> Result<HarnessConfig> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load().context("Failed to load configuration"),
    }
}

#[derive(Debug, Serialize)]
pub struct StepSummary {
    pub name: String,
    pub elapsed_ms: u128,
    pub entities: usize,
}

#[derive(Debug, Serialize)]
pub struct RunOutput {
    pub success: bool,
    pub scenario: String,
    pub run_id: Uuid,
    pub steps: Vec<StepSummary>,
    pub baseline: StateSnapshot,
}

impl From<ScenarioReport> for RunOutput {
    fn from(report: ScenarioReport) -> Self {
        Self {
            success: true,
            scenario: report.scenario,
            run_id: report.run_id,
            steps: report
                .steps
                .into_iter()
                .map(|step| StepSummary {
                    name: step.name,
                    elapsed_ms: step.elapsed.as_millis(),
                    entities: step.baseline.len(),
                })
                .collect(),
            baseline: report.baseline,
        }
    }
}

impl CommandOutput for RunOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "Scenario '{}' converged ({} step(s), run {})",
            self.scenario,
            self.steps.len(),
            self.run_id
        )];
        for step in &self.steps {
            lines.push(format!(
                "  - {}: {} entities in {} ms",
                step.name, step.entities, step.elapsed_ms
            ));
        }
        if !self.baseline.is_empty() {
            lines.push("\nFinal state:".to_string());
            for (id, token) in self.baseline.iter() {
                lines.push(format!("  {id} {token}"));
            }
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Run `scenario` through `transport` with the process logger installed.
pub(crate) async fn drive(
    transport: ShellTransport,
    scenario: &Scenario,
    config: &HarnessConfig,
    json_mode: bool,
) -> Result<()> {
    let _logging = LoggerImpl::init(&config.logging)?;

    let driver = ScenarioDriver::from_transport(
        Arc::new(transport),
        Arc::new(SystemClock),
        Arc::new(TracingLogger::new()),
        config,
    )?;

    let report = driver
        .run(scenario)
        .await
        .with_context(|| format!("Scenario '{}' failed", scenario.name))?;

    output(&RunOutput::from(report), json_mode);
    Ok(())
}
