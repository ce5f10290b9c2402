//! `config` command

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;

use crate::config::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration (token masked)
    Show,
    /// Print the config file location
    Path,
    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn handle_config_command(command: ConfigCommands, path: Option<&Path>) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            let config = Config::load(path)?;
            let rendered =
                toml::to_string_pretty(&config.redacted()).context("Failed to render config")?;
            println!("{}", rendered);
            if let Err(e) = config.validate() {
                println!("{} {}", "warning:".yellow().bold(), e);
            }
        }
        ConfigCommands::Path => {
            println!("{}", Config::resolve_path(path)?.display());
        }
        ConfigCommands::Init { force } => {
            let target = Config::resolve_path(path)?;
            if target.exists() && !force {
                anyhow::bail!(
                    "Config file already exists: {} (use --force to overwrite)",
                    target.display()
                );
            }
            Config::default().save(&target)?;
            println!("Wrote {}", target.display().to_string().green());
        }
    }
    Ok(())
}
