//! Application bootstrap implementation.
//!
//! `LiveTrackApp` loads the event store, builds the shared session context
//! and binds the server, in that order, so that a bad rows file or a busy
//! port is reported before any client can connect.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use super::config::AppConfig;
use super::error::AppError;
use crate::server::StreamServer;
use crate::session::SessionContext;
use crate::store::{EventStore, MemoryEventStore};

/// LiveTrack application.
///
/// # Example
///
/// ```ignore
/// use livetrack::app::{AppConfig, LiveTrackApp};
///
/// let app = LiveTrackApp::start(AppConfig::default()).await?;
/// let shutdown = app.shutdown_token();
/// app.run().await?;
/// ```
pub struct LiveTrackApp {
    server: StreamServer,
    shutdown: CancellationToken,
}

impl LiveTrackApp {
    /// Start the application with the in-memory store described by `config`.
    pub async fn start(config: AppConfig) -> Result<Self, AppError> {
        let store: Arc<dyn EventStore> = match &config.rows_file {
            Some(path) => Arc::new(MemoryEventStore::load_json_lines(path)?),
            None => {
                info!("No rows file configured, starting with an empty store");
                Arc::new(MemoryEventStore::new())
            }
        };
        Self::start_with_store(config, store).await
    }

    /// Start the application on top of an existing store.
    pub async fn start_with_store(
        config: AppConfig,
        store: Arc<dyn EventStore>,
    ) -> Result<Self, AppError> {
        info!(
            store = store.name(),
            period_ms = config.stream.send_period.as_millis() as u64,
            removal_ms = config.stream.removal_period.as_millis() as u64,
            live = config.stream.sources.is_live,
            "Starting LiveTrack"
        );
        let context = SessionContext::new(config.stream, store);
        let server = StreamServer::bind(&config.bind, context).await?;

        Ok(Self {
            server,
            shutdown: CancellationToken::new(),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, AppError> {
        Ok(self.server.local_addr()?)
    }

    /// Token that stops the server and all sessions when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Serve until the shutdown token is cancelled.
    pub async fn run(self) -> Result<(), AppError> {
        self.server.run(self.shutdown).await?;
        info!("LiveTrack stopped");
        Ok(())
    }
}
