//! Outbound message transport.

use thiserror::Error;
use tokio::sync::mpsc;

use crate::store::BoxFuture;

/// Errors raised while delivering a message to a client.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The client is gone.
    #[error("Connection closed")]
    Closed,

    #[error("Send failed: {0}")]
    Send(String),
}

/// Delivers encoded messages to one client.
///
/// A session owns exactly one transport and sends on it from a single task,
/// so implementations only need to preserve the order of `send` calls.
pub trait Transport: Send + Sync {
    fn send(&self, payload: String) -> BoxFuture<'_, Result<(), TransportError>>;
}

/// Transport backed by an unbounded channel.
///
/// Used to embed the engine without a socket and in tests.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelTransport {
    /// Create a transport and the receiving end of its channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Transport for ChannelTransport {
    fn send(&self, payload: String) -> BoxFuture<'_, Result<(), TransportError>> {
        let result = self.tx.send(payload).map_err(|_| TransportError::Closed);
        Box::pin(async move { result })
    }
}
