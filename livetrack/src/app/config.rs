//! Application configuration for `LiveTrackApp`.

use std::path::PathBuf;

use crate::config::ConfigFile;
use crate::server::DEFAULT_BIND;
use crate::session::StreamConfig;

/// Top-level configuration passed to `LiveTrackApp::start()`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Session settings.
    pub stream: StreamConfig,

    /// Listen address.
    pub bind: String,

    /// JSON-lines rows replayed by the in-memory store; empty store if unset.
    pub rows_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new(StreamConfig::default())
    }
}

impl AppConfig {
    pub fn new(stream: StreamConfig) -> Self {
        Self {
            stream,
            bind: DEFAULT_BIND.to_string(),
            rows_file: None,
        }
    }

    /// Create application config from the configuration file.
    pub fn from_config_file(config: &ConfigFile) -> Self {
        Self {
            stream: config.stream_config(),
            bind: config.server.bind.clone(),
            rows_file: config.store.rows_file.clone(),
        }
    }

    pub fn with_bind(mut self, bind: impl Into<String>) -> Self {
        self.bind = bind.into();
        self
    }

    pub fn with_rows_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.rows_file = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.bind, DEFAULT_BIND);
        assert!(config.rows_file.is_none());
    }

    #[test]
    fn test_from_config_file() {
        let mut file = ConfigFile::default();
        file.server.bind = "0.0.0.0:9000".to_string();
        file.store.rows_file = Some(PathBuf::from("rows.jsonl"));

        let config = AppConfig::from_config_file(&file);
        assert_eq!(config.bind, "0.0.0.0:9000");
        assert_eq!(config.rows_file, Some(PathBuf::from("rows.jsonl")));
    }

    #[test]
    fn test_builder_overrides() {
        let config = AppConfig::default()
            .with_bind("127.0.0.1:0")
            .with_rows_file("/data/rows.jsonl");
        assert_eq!(config.bind, "127.0.0.1:0");
        assert_eq!(config.rows_file, Some(PathBuf::from("/data/rows.jsonl")));
    }
}
