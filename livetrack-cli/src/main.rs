//! LiveTrack CLI - Command-line interface
//!
//! Runs the streaming server and manages its configuration file.

mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::serve::ServeArgs;

#[derive(Debug, Parser)]
#[command(
    name = "livetrack",
    version = livetrack::VERSION,
    about = "Live object position streaming"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the WebSocket streaming server
    Serve {
        /// Configuration file (default: ~/.livetrack/config.ini)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Listen address, e.g. 0.0.0.0:8090
        #[arg(long)]
        bind: Option<String>,

        /// JSON-lines file of recorded event rows to replay
        #[arg(long)]
        rows: Option<PathBuf>,

        /// Log filter, e.g. info or livetrack=debug
        #[arg(long)]
        log_level: Option<String>,
    },

    /// Write a default configuration file
    Init,

    /// View configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve {
            config,
            bind,
            rows,
            log_level,
        } => commands::serve::run(ServeArgs {
            config,
            bind,
            rows,
            log_level,
        }),
        Commands::Init => commands::init::run(),
        Commands::Config { command } => commands::config::run(command),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve_args() {
        let cli = Cli::parse_from([
            "livetrack",
            "serve",
            "--bind",
            "0.0.0.0:9000",
            "--log-level",
            "debug",
        ]);
        match cli.command {
            Commands::Serve { bind, log_level, rows, .. } => {
                assert_eq!(bind.as_deref(), Some("0.0.0.0:9000"));
                assert_eq!(log_level.as_deref(), Some("debug"));
                assert!(rows.is_none());
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_parse_config_get() {
        let cli = Cli::parse_from(["livetrack", "config", "get", "server.bind"]);
        assert!(matches!(
            cli.command,
            Commands::Config {
                command: ConfigCommands::Get { ref key }
            } if key == "server.bind"
        ));
    }
}
