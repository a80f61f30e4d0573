//! Init command - write the configuration file.

use livetrack::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Run the init command.
///
/// An existing file is loaded and rewritten, so unknown keys are dropped and
/// missing ones are filled in with defaults.
pub fn run() -> Result<(), CliError> {
    let path = config_file_path()?;
    let config = if path.exists() {
        println!("Updating existing configuration.");
        ConfigFile::load_from(&path)?
    } else {
        ConfigFile::default()
    };
    config.save_to(&path)?;

    println!("Configuration file: {}", path.display());
    println!();
    println!("Edit this file to set the coordinate origin and event sources.");
    println!("CLI arguments override config file values when specified.");
    Ok(())
}
