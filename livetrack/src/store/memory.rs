//! In-process event store.
//!
//! Holds rows per table in memory and evaluates [`Query`] clauses directly.
//! Matching rows come back newest first, mirroring tables clustered by
//! descending timestamp, so `LIMIT 1` selects the latest row.
//!
//! Used for replaying recorded events (see [`MemoryEventStore::load_json_lines`])
//! and in tests.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::query::{Column, Query, QueryParam};
use super::{BoxFuture, EventStore, StoreError};
use crate::object::EventRow;

/// A row together with the table it belongs to (one JSON-lines record).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub table: String,
    #[serde(flatten)]
    pub row: EventRow,
}

/// Event store backed by in-memory tables.
#[derive(Debug, Default)]
pub struct MemoryEventStore {
    tables: RwLock<HashMap<String, Vec<EventRow>>>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load rows from a JSON-lines file of [`TableRow`] records.
    ///
    /// Blank lines and lines starting with `#` are skipped.
    pub fn load_json_lines(path: &Path) -> Result<Self, StoreError> {
        let file = std::fs::File::open(path)?;
        let store = Self::new();
        let mut loaded = 0usize;

        for (index, line) in std::io::BufReader::new(file).lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let record: TableRow =
                serde_json::from_str(trimmed).map_err(|source| StoreError::Decode {
                    line: index + 1,
                    source,
                })?;
            store.insert(record.table, record.row);
            loaded += 1;
        }

        info!(path = %path.display(), rows = loaded, "Loaded event rows");
        Ok(store)
    }

    /// Append a row to a table, creating the table if needed.
    pub fn insert(&self, table: impl Into<String>, row: EventRow) {
        self.tables.write().entry(table.into()).or_default().push(row);
    }

    /// Append several rows to a table.
    pub fn extend(&self, table: impl Into<String>, rows: impl IntoIterator<Item = EventRow>) {
        self.tables
            .write()
            .entry(table.into())
            .or_default()
            .extend(rows);
    }

    /// Number of rows stored in a table.
    pub fn row_count(&self, table: &str) -> usize {
        self.tables.read().get(table).map_or(0, Vec::len)
    }

    fn evaluate(&self, query: &Query) -> Result<Vec<EventRow>, StoreError> {
        let tables = self.tables.read();
        let Some(rows) = tables.get(query.table()) else {
            // Tables are created lazily; an unknown table simply has no rows yet.
            return Ok(Vec::new());
        };

        let mut matched = Vec::new();
        for row in rows {
            if row_matches(row, query)? {
                matched.push(row.clone());
            }
        }

        matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        if let Some(limit) = query.row_limit() {
            matched.truncate(limit);
        }
        Ok(matched)
    }
}

impl EventStore for MemoryEventStore {
    fn execute<'a>(&'a self, query: &'a Query) -> BoxFuture<'a, Result<Vec<EventRow>, StoreError>> {
        Box::pin(async move {
            let rows = self.evaluate(query)?;
            debug!(table = query.table(), rows = rows.len(), "Query executed");
            Ok(rows)
        })
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

fn text_column(row: &EventRow, column: Column) -> Option<&str> {
    match column {
        Column::MessageId => row.message_id.as_deref(),
        Column::FacilityId => row.facility_id.as_deref(),
        Column::Level => row.level.as_deref(),
        Column::SensorType => Some(row.sensor.kind.as_str()),
        Column::SpotId => row.spot_id.as_deref(),
        Column::Timestamp => None,
    }
}

fn row_matches(row: &EventRow, query: &Query) -> Result<bool, StoreError> {
    for (clause, param) in query.bound_clauses() {
        let ordering: Option<Ordering> = match (clause.column, param) {
            (Column::Timestamp, QueryParam::Timestamp(ts)) => Some(row.timestamp.cmp(ts)),
            (Column::Timestamp, QueryParam::Text(_)) | (_, QueryParam::Timestamp(_)) => {
                return Err(StoreError::InvalidQuery(format!(
                    "parameter {} does not match the type of column {}",
                    param,
                    clause.column.name()
                )));
            }
            (column, QueryParam::Text(value)) => {
                text_column(row, column).map(|stored| stored.cmp(value.as_str()))
            }
        };

        match ordering {
            Some(ordering) if clause.op.accepts(ordering) => {}
            _ => return Ok(false),
        }
    }
    Ok(true)
}
