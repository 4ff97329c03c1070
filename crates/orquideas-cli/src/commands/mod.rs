//! Command implementations

mod config;
mod inspect;
mod report;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;
use anyhow::Result;

/// Execute a CLI command
pub fn execute(cli: Cli, output: &OutputWriter) -> Result<()> {
    let config_file = cli.config;

    match cli.command {
        Commands::Report(args) => report::execute(args, config_file.as_deref(), output),
        Commands::Inspect(args) => inspect::execute(args, config_file.as_deref(), output),
        Commands::Config(args) => config::execute(args, config_file.as_deref(), output),
    }
}
