//! Convergence harness CLI entry point.

use clap::Parser;

use convergence_harness::cli::commands;
use convergence_harness::cli::{handle_error, Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = cli.config.as_deref();

    let result = match cli.command {
        Commands::Run(args) => commands::run::execute(args, config, cli.json).await,
        Commands::LabelChanges(args) => {
            commands::label_changes::execute(args, config, cli.json).await
        }
        Commands::Config => commands::config::execute(config, cli.json),
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
