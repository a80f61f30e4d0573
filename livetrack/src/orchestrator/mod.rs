//! Per-tick query orchestration
//!
//! Decides which event tables one tick has to read, builds the parameterized
//! queries for the tick's time window and runs them concurrently against the
//! shared [`EventStore`](crate::store::EventStore).
//!
//! Detections are always queried. Aisle vehicles and parking spots are read
//! when enabled in [`SourceConfig`]. Parking spots need priming: the first
//! tick of a session reads each spot's full state, later ticks read only the
//! changes within the window.

mod fetch;
mod types;

pub use fetch::{PlannedQuery, QueryOrchestrator};
pub use types::{FetchRequest, ParkingPhase, SourceConfig, TimeWindow, DEFAULT_SENSOR_TYPE};
