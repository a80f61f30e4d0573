//! Session errors.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::transport::TransportError;
use crate::object::format_timestamp;
use crate::store::StoreError;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique session identifier, used in logs and the session registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    /// Allocate the next identifier.
    pub fn next() -> Self {
        Self(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Problems with the request that opens a session.
#[derive(Debug, Error)]
pub enum InputError {
    /// The request is not a JSON object with the expected fields.
    #[error("Invalid Request: {0}")]
    Malformed(#[from] serde_json::Error),

    /// `startTimestamp` could not be parsed.
    #[error("Invalid Timestamp")]
    InvalidTimestamp(String),
}

/// Why a session stopped with an error. Every variant is terminal.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{session}: {source}")]
    Input {
        session: SessionId,
        #[source]
        source: InputError,
    },

    #[error("{session}: query for tick {} failed: {source}", format_timestamp(.tick))]
    Store {
        session: SessionId,
        tick: DateTime<Utc>,
        #[source]
        source: StoreError,
    },

    #[error("{session}: encoding tick {} failed: {source}", format_timestamp(.tick))]
    Encode {
        session: SessionId,
        tick: DateTime<Utc>,
        #[source]
        source: serde_json::Error,
    },

    #[error("{session}: sending tick {} failed: {source}", format_timestamp(.tick))]
    Transport {
        session: SessionId,
        tick: DateTime<Utc>,
        /// Log-bounded rendering of the payload that could not be sent.
        snapshot: String,
        #[source]
        source: TransportError,
    },
}

impl SessionError {
    pub fn session(&self) -> SessionId {
        match self {
            SessionError::Input { session, .. }
            | SessionError::Store { session, .. }
            | SessionError::Encode { session, .. }
            | SessionError::Transport { session, .. } => *session,
        }
    }
}
