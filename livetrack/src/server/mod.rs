//! WebSocket streaming server
//!
//! Each accepted connection is one session: the first text frame is the open
//! request, after which the server runs a [`SessionScheduler`] that writes
//! updates back on the same socket. Frames received after the open request
//! are ignored. A client close or disconnect cancels that session; server
//! shutdown cancels all of them.

mod transport;

pub use transport::WebSocketTransport;

use std::net::SocketAddr;
use std::sync::Arc;

use dashmap::DashMap;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::StreamExt;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{accept_async, tungstenite, tungstenite::Message, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::session::{SessionContext, SessionError, SessionId, SessionScheduler};

/// Default listen address.
pub const DEFAULT_BIND: &str = "127.0.0.1:8090";

/// Errors raised by the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),
}

type SessionRegistry = Arc<DashMap<SessionId, CancellationToken>>;

/// Accepts WebSocket clients and runs one session per connection.
pub struct StreamServer {
    listener: TcpListener,
    context: SessionContext,
    sessions: SessionRegistry,
}

impl StreamServer {
    /// Bind the listener.
    pub async fn bind(addr: &str, context: SessionContext) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(addr).await.map_err(|source| ServerError::Bind {
            addr: addr.to_string(),
            source,
        })?;
        Ok(Self {
            listener,
            context,
            sessions: Arc::new(DashMap::new()),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Number of sessions currently running.
    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Accept connections until `shutdown` is cancelled, then cancel every
    /// running session.
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), ServerError> {
        info!(addr = %self.local_addr()?, "Stream server listening");

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => break,

                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        debug!(%peer, "Connection accepted");
                        let context = self.context.clone();
                        let sessions = Arc::clone(&self.sessions);
                        let cancellation = shutdown.child_token();
                        tokio::spawn(async move {
                            let result =
                                handle_connection(stream, peer, context, sessions, cancellation)
                                    .await;
                            if let Err(e) = result {
                                warn!(%peer, error = %e, "Connection error");
                            }
                        });
                    }
                    Err(e) => error!(error = %e, "Accept failed"),
                },
            }
        }

        let running = self.sessions.len();
        for entry in self.sessions.iter() {
            entry.value().cancel();
        }
        info!(sessions = running, "Stream server stopped");
        Ok(())
    }
}

type WsStream = WebSocketStream<TcpStream>;

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    context: SessionContext,
    sessions: SessionRegistry,
    cancellation: CancellationToken,
) -> Result<(), ServerError> {
    let opened = tokio::select! {
        biased;

        _ = cancellation.cancelled() => {
            debug!(%peer, "Shutdown before open request");
            return Ok(());
        }

        opened = accept_open_request(stream) => opened?,
    };
    let Some((sink, mut source, request)) = opened else {
        debug!(%peer, "Closed before open request");
        return Ok(());
    };

    let transport = Arc::new(WebSocketTransport::new(sink));
    let mut scheduler =
        SessionScheduler::with_cancellation(context, transport.clone(), cancellation.clone());
    let id = scheduler.id();
    sessions.insert(id, cancellation.clone());
    info!(session = %id, %peer, "Client connected");

    // Watch the read half: a close frame or a broken connection ends the session.
    let watcher = tokio::spawn(async move {
        while let Some(frame) = source.next().await {
            match frame {
                Ok(Message::Close(_)) | Err(_) => break,
                Ok(_) => debug!(session = %id, "Ignoring frame after open request"),
            }
        }
        cancellation.cancel();
    });

    let result = scheduler.run(&request).await;

    watcher.abort();
    sessions.remove(&id);
    transport.close().await;

    match result {
        Ok(summary) => info!(session = %id, ticks = summary.ticks_sent, "Client disconnected"),
        // Already logged by the scheduler.
        Err(SessionError::Input { .. }) => debug!(session = %id, "Session rejected"),
        Err(e) => debug!(session = %id, error = %e, "Session ended with error"),
    }
    Ok(())
}

/// Complete the handshake and wait for the first text frame.
///
/// Returns `None` when the client goes away before sending one.
async fn accept_open_request(
    stream: TcpStream,
) -> Result<Option<(SplitSink<WsStream, Message>, SplitStream<WsStream>, String)>, ServerError> {
    let ws = accept_async(stream).await?;
    let (sink, mut source) = ws.split();

    while let Some(frame) = source.next().await {
        match frame? {
            Message::Text(text) => return Ok(Some((sink, source, text))),
            Message::Close(_) => return Ok(None),
            _ => continue,
        }
    }
    Ok(None)
}
