//! Implementation of the `convergence-harness label-changes` command.

use anyhow::Result;
use std::path::Path;

use super::{drive, load_config};
use crate::cli::types::LabelChangesArgs;
use crate::domain::models::Scenario;
use crate::infrastructure::KubectlPreset;

pub async fn execute(
    args: LabelChangesArgs,
    config_path: Option<&Path>,
    json_mode: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let (preset, scenario) = build(args);

    drive(preset.transport(), &scenario, &config, json_mode).await
}

fn build(args: LabelChangesArgs) -> (KubectlPreset, Scenario) {
    let preset = KubectlPreset {
        kubectl: args.kubectl,
        namespace: args.namespace,
        selector: args.selector,
        label: args.label,
        identity_annotation: args.identity_annotation,
    };
    let scenario = preset.label_change_scenario().expect_entities(args.expect);
    (preset, scenario)
}
