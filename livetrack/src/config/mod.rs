//! Configuration file support
//!
//! Settings live in an INI file, by default `~/.livetrack/config.ini`.
//! Missing sections and keys fall back to defaults, so an empty or absent
//! file yields a working configuration.
//!
//! ```ini
//! [stream]
//! is_live = true
//! send_period_ms = 1000
//! removal_period_ms = 5000
//!
//! [coordinates]
//! origin_lat = 37.3861
//! origin_lon = -121.9635
//! x_mult = -1
//! y_mult = 1
//! ```

mod file;

pub use file::{
    ConfigFile, CoordinateSettings, LoggingSettings, ServerSettings, StoreSettings, StreamSettings,
};

use std::path::PathBuf;

use thiserror::Error;

/// Directory under the home directory holding the configuration.
pub const CONFIG_DIR_NAME: &str = ".livetrack";

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Errors raised while reading or writing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Unknown config key: {0}")]
    UnknownKey(String),

    #[error("Could not determine home directory")]
    NoHomeDirectory,
}

/// `~/.livetrack`
pub fn config_directory() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(CONFIG_DIR_NAME))
        .ok_or(ConfigError::NoHomeDirectory)
}

/// `~/.livetrack/config.ini`
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_directory()?.join(CONFIG_FILE_NAME))
}
