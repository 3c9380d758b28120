//! Implementation of the `convergence-harness config` command.

use anyhow::Result;
use serde::Serialize;
use std::path::Path;

use super::load_config;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::HarnessConfig;

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct ConfigOutput(pub HarnessConfig);

impl CommandOutput for ConfigOutput {
    fn to_human(&self) -> String {
        serde_yaml::to_string(&self.0).unwrap_or_default()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub fn execute(config_path: Option<&Path>, json_mode: bool) -> Result<()> {
    let config = load_config(config_path)?;
    output(&ConfigOutput(config), json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_output_renders_yaml() {
        let human = ConfigOutput(HarnessConfig::default()).to_human();
        assert!(human.contains("deadline_secs: 180"));
        assert!(human.contains("command: uptime"));
    }
}
