use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;

use crate::domain::errors::ConfigError;
use crate::domain::models::HarnessConfig;

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .convergence/config.yaml (project config)
    /// 3. .convergence/local.yaml (project local overrides, optional)
    /// 4. Environment variables (CONVERGENCE_* prefix, highest priority)
    pub fn load() -> Result<HarnessConfig> {
        let config: HarnessConfig = Self::figment()
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<HarnessConfig> {
        let config: HarnessConfig = Figment::new()
            .merge(Serialized::defaults(HarnessConfig::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(HarnessConfig::default()))
            .merge(Yaml::file(".convergence/config.yaml"))
            .merge(Yaml::file(".convergence/local.yaml"))
            .merge(Env::prefixed("CONVERGENCE_").split("__"))
    }

    /// Validate configuration after loading
    pub fn validate(config: &HarnessConfig) -> Result<(), ConfigError> {
        config.poll.to_spec()?;
        config.precondition.to_spec()?;

        if config.reporter.command.trim().is_empty() {
            return Err(ConfigError::EmptyCommand("Reporter"));
        }

        if config.reporter.interval_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "reporter.interval_secs must be at least 1".to_string(),
            ));
        }

        if config
            .failure_report
            .iter()
            .any(|command| command.trim().is_empty())
        {
            return Err(ConfigError::EmptyCommand("Failure report"));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        Ok(())
    }
}
