//! Command dispatch.

use super::command::{CheckCommand, Cli, Commands};
use super::{check, output, run};
use crate::error::Result;

/// Configure output and run the parsed command.
pub async fn execute(cli: Cli) -> Result<()> {
    output::configure(output::OutputConfig::new(cli.json, cli.quiet, cli.verbose));

    match cli.command {
        Commands::Run(args) => run::execute(&args).await,
        Commands::Check(CheckCommand::Config(args)) => check::config::execute(&args),
        Commands::Check(CheckCommand::Connection(args)) => check::connection::execute(&args).await,
    }
}
