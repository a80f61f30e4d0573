//! Client streaming sessions
//!
//! A session is opened by a single request naming a facility, a level and a
//! logical start time. From then on the [`SessionScheduler`] emits one update
//! per send period: it queries the event store for the window since the
//! previous update, normalizes and tracks the objects, and sends a
//! [`TickMessage`] over the session's [`Transport`].
//!
//! ```text
//! Starting ──valid request──► Running ──cancel / store or send failure──► Closed
//!     └──────invalid request (error reply)──────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use livetrack::session::{ChannelTransport, SessionContext, SessionScheduler, StreamConfig};
//! use livetrack::store::MemoryEventStore;
//!
//! let context = SessionContext::new(StreamConfig::default(), Arc::new(MemoryEventStore::new()));
//! let (transport, mut updates) = ChannelTransport::new();
//! let mut scheduler = SessionScheduler::new(context, Arc::new(transport));
//! scheduler
//!     .run(r#"{"startTimestamp":"2024-05-01T12:00:00Z","facilityId":"garage1","levelId":"L1"}"#)
//!     .await?;
//! ```

mod config;
mod error;
mod message;
mod request;
mod scheduler;
mod state;
mod transport;

pub use config::{StreamConfig, DEFAULT_REMOVAL_PERIOD, DEFAULT_SEND_PERIOD};
pub use error::{InputError, SessionError, SessionId};
pub use message::{
    truncate_for_log, ErrorMessage, TickData, TickMessage, TickMetadata, DEFAULT_LOG_PAYLOAD_LIMIT,
};
pub use request::{parse_timestamp, SessionRequest};
pub use scheduler::{SessionContext, SessionPhase, SessionScheduler, SessionSummary};
pub use state::{SessionClock, SessionState};
pub use transport::{ChannelTransport, Transport, TransportError};
