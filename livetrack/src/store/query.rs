//! Parameterized event store queries.
//!
//! A [`Query`] is a table, an ordered list of `column <op> ?` clauses, and the
//! positional parameters bound to those clauses. Backends that speak a CQL
//! dialect execute [`Query::statement`] with [`Query::params`]; in-process
//! backends evaluate the clauses directly.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::object::format_timestamp;

/// Columns every event row carries.
const SELECTED_COLUMNS: &str = "timestamp, place, sensor, object, event";

/// Columns a query can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    MessageId,
    FacilityId,
    Level,
    SensorType,
    SpotId,
    Timestamp,
}

impl Column {
    /// Column name as stored.
    pub fn name(&self) -> &'static str {
        match self {
            Column::MessageId => "messageid",
            Column::FacilityId => "garageid",
            Column::Level => "level",
            Column::SensorType => "sensortype",
            Column::SpotId => "spotid",
            Column::Timestamp => "timestamp",
        }
    }
}

/// Comparison operator of a clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Comparison {
    pub fn symbol(&self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::Gt => ">",
            Comparison::Gte => ">=",
            Comparison::Lt => "<",
            Comparison::Lte => "<=",
        }
    }

    /// Whether `ordering` (of row value against parameter) satisfies the operator.
    pub fn accepts(&self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            Comparison::Eq => ordering == Equal,
            Comparison::Gt => ordering == Greater,
            Comparison::Gte => ordering != Less,
            Comparison::Lt => ordering == Less,
            Comparison::Lte => ordering != Greater,
        }
    }
}

/// One `column <op> ?` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clause {
    pub column: Column,
    pub op: Comparison,
}

/// A positional parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryParam {
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl QueryParam {
    pub fn text(value: impl Into<String>) -> Self {
        QueryParam::Text(value.into())
    }
}

impl fmt::Display for QueryParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryParam::Text(s) => write!(f, "'{}'", s),
            QueryParam::Timestamp(ts) => write!(f, "{}", format_timestamp(ts)),
        }
    }
}

/// A parameterized selection over one table.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    table: String,
    clauses: Vec<Clause>,
    params: Vec<QueryParam>,
    limit: Option<usize>,
}

impl Query {
    /// Start a selection over `table`.
    pub fn select(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            clauses: Vec::new(),
            params: Vec::new(),
            limit: None,
        }
    }

    /// Add a clause and bind its parameter.
    pub fn filter(mut self, column: Column, op: Comparison, param: QueryParam) -> Self {
        self.clauses.push(Clause { column, op });
        self.params.push(param);
        self
    }

    /// Shorthand for an equality clause on a text column.
    pub fn eq(self, column: Column, value: impl Into<String>) -> Self {
        self.filter(column, Comparison::Eq, QueryParam::text(value))
    }

    /// Return at most `limit` rows (newest first).
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn params(&self) -> &[QueryParam] {
        &self.params
    }

    pub fn row_limit(&self) -> Option<usize> {
        self.limit
    }

    /// Clauses paired with their bound parameters.
    pub fn bound_clauses(&self) -> impl Iterator<Item = (&Clause, &QueryParam)> {
        self.clauses.iter().zip(self.params.iter())
    }

    /// Statement text with `?` placeholders.
    pub fn statement(&self) -> String {
        let mut statement = format!("SELECT {} FROM {}", SELECTED_COLUMNS, self.table);
        for (i, clause) in self.clauses.iter().enumerate() {
            statement.push_str(if i == 0 { " WHERE " } else { " AND " });
            statement.push_str(clause.column.name());
            statement.push(' ');
            statement.push_str(clause.op.symbol());
            statement.push_str(" ?");
        }
        if let Some(limit) = self.limit {
            statement.push_str(&format!(" LIMIT {}", limit));
        }
        statement
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [", self.statement())?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param)?;
        }
        write!(f, "]")
    }
}

/// Table names of the event store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    /// Generic detections keyed by `<facility>-<level>`.
    pub detections: String,
    /// Vehicles moving in aisles keyed by `<facility>-<level>`.
    pub aisle: String,
    /// Parking spot changes keyed by facility/level/sensor type.
    pub parking_delta: String,
    /// Current parking spot state keyed by facility/level.
    pub parking_state: String,
    /// Parking spot history keyed by facility/level/sensor type/spot.
    pub parking_playback: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            detections: "objectmarker".to_string(),
            aisle: "aisle".to_string(),
            parking_delta: "parkingSpotDelta".to_string(),
            parking_state: "parkingSpotState".to_string(),
            parking_playback: "parkingSpotPlayback".to_string(),
        }
    }
}
