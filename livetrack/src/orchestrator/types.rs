//! Orchestrator types

use std::fmt;

use chrono::{DateTime, Utc};

use crate::object::format_timestamp;
use crate::store::TableNames;

/// Default sensor type bound into parking queries.
pub const DEFAULT_SENSOR_TYPE: &str = "Camera";

/// Half-open query window `(start, end]`.
///
/// Consecutive windows share a boundary; the open lower bound keeps an event
/// stamped exactly on the boundary from being delivered twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Whether `ts` falls inside the window.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts > self.start && ts <= self.end
    }

    /// Length of the window (zero if inverted).
    pub fn duration(&self) -> chrono::Duration {
        (self.end - self.start).max(chrono::Duration::zero())
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}]",
            format_timestamp(&self.start),
            format_timestamp(&self.end)
        )
    }
}

/// Whether parking spot state still has to be primed for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParkingPhase {
    /// No tick has been delivered yet: read the full spot state.
    Prime,
    /// Spot state was delivered: read changes within the window only.
    Delta,
}

/// Everything needed to query one tick's rows.
#[derive(Debug, Clone, Copy)]
pub struct FetchRequest<'a> {
    pub facility_id: &'a str,
    pub level_id: &'a str,
    pub window: TimeWindow,
    /// Logical start time requested by the client.
    pub session_start: DateTime<Utc>,
    pub parking: ParkingPhase,
}

impl FetchRequest<'_> {
    /// Partition key of the detection and aisle tables.
    pub fn message_id(&self) -> String {
        format!("{}-{}", self.facility_id, self.level_id)
    }
}

/// Which sources are queried and how.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceConfig {
    pub tables: TableNames,

    /// Sensor type bound into parking queries.
    pub sensor_type: String,

    /// Live feed (true) or playback of recorded events (false).
    pub is_live: bool,

    /// Delay applied by live clients; a non-zero delay means spot state must
    /// be read from history instead of the current-state table.
    pub ui_delay_seconds: f64,

    /// Query moving vehicles from the aisle table.
    pub track_vehicles: bool,

    /// Query parking spot state and changes.
    pub track_parking: bool,

    /// Spots queried individually when priming from history.
    pub parking_spots: Vec<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            tables: TableNames::default(),
            sensor_type: DEFAULT_SENSOR_TYPE.to_string(),
            is_live: true,
            ui_delay_seconds: 0.0,
            track_vehicles: false,
            track_parking: false,
            parking_spots: Vec::new(),
        }
    }
}

impl SourceConfig {
    pub fn with_vehicles(mut self, enabled: bool) -> Self {
        self.track_vehicles = enabled;
        self
    }

    pub fn with_parking(mut self, spots: Vec<String>) -> Self {
        self.track_parking = true;
        self.parking_spots = spots;
        self
    }

    pub fn with_live(mut self, is_live: bool) -> Self {
        self.is_live = is_live;
        self
    }

    pub fn with_ui_delay_seconds(mut self, seconds: f64) -> Self {
        self.ui_delay_seconds = seconds;
        self
    }

    pub fn with_sensor_type(mut self, sensor_type: impl Into<String>) -> Self {
        self.sensor_type = sensor_type.into();
        self
    }

    pub fn with_tables(mut self, tables: TableNames) -> Self {
        self.tables = tables;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_window_is_half_open() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 1).unwrap();
        let window = TimeWindow::new(start, end);

        assert!(!window.contains(start));
        assert!(window.contains(end));
        assert_eq!(window.duration(), chrono::Duration::seconds(1));
    }

    #[test]
    fn test_message_id() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let request = FetchRequest {
            facility_id: "garage1",
            level_id: "L2",
            window: TimeWindow::new(ts, ts),
            session_start: ts,
            parking: ParkingPhase::Prime,
        };
        assert_eq!(request.message_id(), "garage1-L2");
    }

    #[test]
    fn test_source_config_defaults() {
        let config = SourceConfig::default();
        assert!(config.is_live);
        assert!(!config.track_vehicles);
        assert!(!config.track_parking);
        assert_eq!(config.sensor_type, "Camera");
    }
}
