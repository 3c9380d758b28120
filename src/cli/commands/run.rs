//! Implementation of the `convergence-harness run` command.

use anyhow::{Context, Result};
use std::path::Path;

use super::{drive, load_config};
use crate::cli::types::RunArgs;
use crate::domain::models::Scenario;
use crate::infrastructure::ShellTransport;

pub async fn execute(args: RunArgs, config_path: Option<&Path>, json_mode: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let scenario = read_scenario(&args.scenario).await?;
    let transport = ShellTransport::with_shell(args.shell, args.snapshot_command);

    drive(transport, &scenario, &config, json_mode).await
}

/// Parse a scenario file.
pub async fn read_scenario(path: &Path) -> Result<Scenario> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read scenario {}", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse scenario {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_read_scenario() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "name: relabel\nselector: app=web\nsteps:\n  - name: label\n    mutation:\n      scope:\n        kind: each_tracked\n      change: label {{entity}}"
        )
        .unwrap();
        file.flush().unwrap();

        let scenario = read_scenario(file.path()).await.expect("scenario");
        assert_eq!(scenario.name, "relabel");
        assert_eq!(scenario.steps.len(), 1);
    }

    #[tokio::test]
    async fn test_read_missing_scenario() {
        let err = read_scenario(Path::new("/nonexistent/scenario.yaml"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read scenario"));
    }
}
