//! Configuration CLI commands.
//!
//! Provides `config get`, `config list`, and `config path` for viewing
//! settings from the command line.

use clap::Subcommand;
use livetrack::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Get a configuration value
    Get {
        /// Configuration key in format section.key (e.g., stream.send_period_ms)
        key: String,
    },

    /// List all configuration settings
    List,

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => run_get(&key),
        ConfigCommands::List => run_list(),
        ConfigCommands::Path => run_path(),
    }
}

fn run_get(key: &str) -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    let value = config.get(key).map_err(|_| {
        CliError::Config(format!(
            "Unknown configuration key '{}'. Use 'livetrack config list' to see available keys.",
            key
        ))
    })?;

    if value.is_empty() {
        println!("(not set)");
    } else {
        println!("{}", value);
    }
    Ok(())
}

fn run_list() -> Result<(), CliError> {
    let config = ConfigFile::load()?;

    println!("Configuration Settings");
    println!("======================");

    let mut current_section = String::new();
    for (key, value) in config.entries() {
        let (section, name) = key.split_once('.').unwrap_or(("", key.as_str()));

        if section != current_section {
            println!();
            println!("[{}]", section);
            current_section = section.to_string();
        }

        if value.is_empty() {
            println!("  {} = (not set)", name);
        } else {
            println!("  {} = {}", name, value);
        }
    }
    Ok(())
}

fn run_path() -> Result<(), CliError> {
    println!("{}", config_file_path()?.display());
    Ok(())
}
