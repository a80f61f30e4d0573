//! Event store contract.
//!
//! Sensor events are persisted upstream in a time-indexed store. The streaming
//! engine only ever reads from it through [`EventStore::execute`]: one
//! parameterized [`Query`] in, the matching rows out. The store handle is
//! shared by every session (`Arc<dyn EventStore>`) and must be safe to call
//! concurrently.
//!
//! Retry policy, connection pooling and the like belong to the store
//! implementation; callers propagate errors unchanged.

mod memory;
mod query;

pub use memory::{MemoryEventStore, TableRow};
pub use query::{Clause, Column, Comparison, Query, QueryParam, TableNames};

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::object::EventRow;

/// Errors returned by event store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The query could not be evaluated (unknown table, type mismatch, ...).
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// I/O error while loading rows.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored row could not be decoded.
    #[error("Malformed row at line {line}: {source}")]
    Decode {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Read access to the persisted event store.
///
/// Rows come back in store-native order; callers must not assume any
/// ordering.
pub trait EventStore: Send + Sync {
    /// Execute a query and return all matching rows.
    fn execute<'a>(&'a self, query: &'a Query) -> BoxFuture<'a, Result<Vec<EventRow>, StoreError>>;

    /// Short backend name for logs.
    fn name(&self) -> &'static str {
        "store"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Unavailable("connection refused".to_string());
        assert_eq!(err.to_string(), "Store unavailable: connection refused");

        let err = StoreError::InvalidQuery("unknown table 'x'".to_string());
        assert!(err.to_string().contains("unknown table"));
    }

    #[test]
    fn test_store_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "rows.jsonl");
        let err: StoreError = io_err.into();
        assert!(matches!(err, StoreError::Io(_)));
    }
}
