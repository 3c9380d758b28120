use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::polling::TimeoutSpec;
use crate::domain::errors::ConfigError;

/// Main configuration structure for the harness
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HarnessConfig {
    /// Deadline and interval used while waiting for convergence after a mutation
    #[serde(default)]
    pub poll: PollSettings,

    /// Deadline and interval used while waiting for every entity to get a state
    #[serde(default)]
    pub precondition: PollSettings,

    /// Background diagnostic reporter
    #[serde(default)]
    pub reporter: ReporterConfig,

    /// Diagnostic commands captured once when a step fails
    #[serde(default = "default_failure_report")]
    pub failure_report: Vec<String>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            poll: PollSettings::default(),
            precondition: PollSettings::default(),
            reporter: ReporterConfig::default(),
            failure_report: default_failure_report(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_failure_report() -> Vec<String> {
    Vec::new()
}

/// Polling deadline and interval expressed in whole seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PollSettings {
    /// Total time budget in seconds
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,

    /// Seconds to wait between two attempts
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

const fn default_deadline_secs() -> u64 {
    TimeoutSpec::DEFAULT_DEADLINE.as_secs()
}

const fn default_interval_secs() -> u64 {
    TimeoutSpec::DEFAULT_INTERVAL.as_secs()
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            deadline_secs: default_deadline_secs(),
            interval_secs: default_interval_secs(),
        }
    }
}

impl PollSettings {
    /// Convert to a validated [`TimeoutSpec`].
    pub fn to_spec(self) -> Result<TimeoutSpec, ConfigError> {
        TimeoutSpec::from_secs(self.deadline_secs, self.interval_secs)
    }
}

/// What to do when the background reporter cannot be launched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReporterPolicy {
    /// Fail the scenario before any step runs
    #[default]
    Required,
    /// Log the failure and run the scenario without diagnostics
    BestEffort,
}

/// Background diagnostic reporter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ReporterConfig {
    /// Command issued against the transport on every tick
    #[serde(default = "default_reporter_command")]
    pub command: String,

    /// Seconds between two diagnostic invocations
    #[serde(default = "default_reporter_interval_secs")]
    pub interval_secs: u64,

    /// Launch failure policy
    #[serde(default)]
    pub policy: ReporterPolicy,
}

fn default_reporter_command() -> String {
    "uptime".to_string()
}

const fn default_reporter_interval_secs() -> u64 {
    4
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            command: default_reporter_command(),
            interval_secs: default_reporter_interval_secs(),
            policy: ReporterPolicy::default(),
        }
    }
}

impl ReporterConfig {
    /// Tick interval of the reporter task.
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for daily-rolling JSON log files (stdout only when unset)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_settings_to_spec() {
        let spec = PollSettings {
            deadline_secs: 60,
            interval_secs: 2,
        }
        .to_spec()
        .expect("valid settings");
        assert_eq!(spec.deadline(), Duration::from_secs(60));
        assert_eq!(spec.interval(), Duration::from_secs(2));
    }

    #[test]
    fn test_reporter_policy_yaml() {
        let config: ReporterConfig =
            serde_yaml::from_str("policy: best_effort").expect("YAML should parse");
        assert_eq!(config.policy, ReporterPolicy::BestEffort);
        assert_eq!(config.command, "uptime");
        assert_eq!(config.interval(), Duration::from_secs(4));
    }
}
