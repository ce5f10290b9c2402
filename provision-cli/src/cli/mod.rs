//! Command-line interface

pub mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::Config;
use commands::config::ConfigCommands;
use commands::extract::ExtractCommands;
use commands::import::ImportCommands;

#[derive(Parser, Debug)]
#[command(
    name = "provision-cli",
    version,
    about = "Create customer records and lookup users from a spreadsheet of identifiers"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Config file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Provision every identifier in a spreadsheet
    Import(ImportCommands),
    /// Show the identifiers a spreadsheet yields, without calling the API
    Extract(ExtractCommands),
    /// Inspect or initialise the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),
}

pub async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Import(args) => {
            let config = Config::load(config_path)?;
            commands::import::handle_import_command(args, config).await
        }
        Commands::Extract(args) => commands::extract::handle_extract_command(args),
        Commands::Config(command) => commands::config::handle_config_command(command, config_path),
    }
}
