//! Application error types.

use std::fmt;

use crate::config::ConfigError;
use crate::server::ServerError;
use crate::store::StoreError;

/// Errors that can occur during application lifecycle.
#[derive(Debug)]
pub enum AppError {
    /// Failed to load the replay store.
    StoreLoad(StoreError),

    /// Failed to start or run the server.
    Server(ServerError),

    /// Configuration error.
    Config(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::StoreLoad(e) => write!(f, "Failed to load event store: {}", e),
            AppError::Server(e) => write!(f, "Server error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::StoreLoad(e) => Some(e),
            AppError::Server(e) => Some(e),
            AppError::Config(_) => None,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::StoreLoad(e)
    }
}

impl From<ServerError> for AppError {
    fn from(e: ServerError) -> Self {
        AppError::Server(e)
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Config("bad origin".to_string());
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("bad origin"));
    }

    #[test]
    fn test_app_error_from_store_error() {
        let store_err = StoreError::Unavailable("down".to_string());
        let app_err: AppError = store_err.into();
        assert!(matches!(app_err, AppError::StoreLoad(_)));
        assert!(std::error::Error::source(&app_err).is_some());
    }
}
