//! WebSocket transport.

use futures_util::{Sink, SinkExt};
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::{self, Message};

use crate::session::{Transport, TransportError};
use crate::store::BoxFuture;

/// Sends session messages as text frames on the write half of a WebSocket.
pub struct WebSocketTransport<S> {
    sink: Mutex<S>,
}

impl<S> WebSocketTransport<S>
where
    S: Sink<Message, Error = tungstenite::Error> + Unpin + Send,
{
    pub fn new(sink: S) -> Self {
        Self {
            sink: Mutex::new(sink),
        }
    }

    /// Send a close frame; errors are ignored since the peer may be gone.
    pub async fn close(&self) {
        let _ = self.sink.lock().await.close().await;
    }
}

impl<S> Transport for WebSocketTransport<S>
where
    S: Sink<Message, Error = tungstenite::Error> + Unpin + Send,
{
    fn send(&self, payload: String) -> BoxFuture<'_, Result<(), TransportError>> {
        Box::pin(async move {
            let mut sink = self.sink.lock().await;
            sink.send(Message::Text(payload)).await.map_err(|e| match e {
                tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
                    TransportError::Closed
                }
                other => TransportError::Send(other.to_string()),
            })
        })
    }
}
