//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "convergence-harness")]
#[command(about = "Drive mutations and wait for derived state to converge", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .convergence/config.yaml plus env)
    #[arg(short, long, global = true, env = "CONVERGENCE_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a scenario described in a YAML file
    Run(RunArgs),

    /// Run the pod and namespace label-change scenario through kubectl
    LabelChanges(LabelChangesArgs),

    /// Print the effective configuration
    Config,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Scenario file
    pub scenario: PathBuf,

    /// Command printing `<id> [<token>]` lines; `{selector}` is substituted
    #[arg(long, env = "CONVERGENCE_SNAPSHOT_COMMAND")]
    pub snapshot_command: String,

    /// Shell used to run every command
    #[arg(long, default_value = "sh")]
    pub shell: String,
}

#[derive(Args, Debug)]
pub struct LabelChangesArgs {
    /// Namespace holding the tracked pods
    #[arg(short, long, default_value = "default")]
    pub namespace: String,

    /// Label selector of the tracked pods
    #[arg(short, long, default_value = "zgroup=testapp")]
    pub selector: String,

    /// Label applied and then removed, as key=value
    #[arg(short, long, default_value = "foo-bar=new-label")]
    pub label: String,

    /// kubectl binary
    #[arg(long, default_value = "kubectl", env = "KUBECTL")]
    pub kubectl: String,

    /// Pod annotation carrying the identity
    #[arg(long, default_value = "io.cilium.identity")]
    pub identity_annotation: String,

    /// Pods that must exist before the first step (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub expect: Vec<String>,
}
