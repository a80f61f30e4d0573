//! Canonical object representation pushed to map clients.
//!
//! Every detection, whatever table it came from, is normalized into a
//! [`TrackedObject`]. The shared "positioned, timestamped, removable" fields
//! live on the struct; the fields that only exist for one kind of object live
//! in [`ObjectKind`].

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

use crate::coord::{GeoPosition, LocalPosition};

/// Parking lifecycle state of a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParkingState {
    Moving,
    Parked,
    Empty,
}

impl ParkingState {
    /// Whether the state refers to a specific parking spot.
    pub fn has_spot(&self) -> bool {
        matches!(self, ParkingState::Parked | ParkingState::Empty)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParkingState::Moving => "moving",
            ParkingState::Parked => "parked",
            ParkingState::Empty => "empty",
        }
    }
}

impl std::fmt::Display for ParkingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Variant-specific object attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ObjectKind {
    /// Person, equipment or any other tracked detection.
    #[serde(rename_all = "camelCase")]
    Generic {
        facility_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        tracker_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        class_id: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        class_desc: Option<String>,
    },

    /// Vehicle seen in an aisle or a parking spot.
    #[serde(rename_all = "camelCase")]
    Vehicle {
        color: String,
        license_plate: String,
        license_state: String,
        vehicle_type: String,
        state: ParkingState,
        /// Empty unless `state` is parked or empty.
        parking_spot_id: String,
    },
}

/// A normalized observation of one object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedObject {
    /// Stable object identity.
    pub id: String,

    /// Observation time (retirement time for retired objects).
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,

    pub level_id: String,

    /// Local x in metres, after axis multipliers.
    pub x: f64,
    /// Local y in metres, after axis multipliers.
    pub y: f64,
    pub lat: f64,
    pub lon: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<f64>,

    pub sensor_type: String,

    /// Upstream event type (`enter`, `exit`, `moving`, `parked`, `empty`, ...).
    pub event_type: String,

    /// Encoded as `0`/`1`; map clients drop markers flagged `1`.
    #[serde(serialize_with = "serialize_flag")]
    pub removed: bool,

    #[serde(flatten)]
    pub kind: ObjectKind,
}

impl TrackedObject {
    /// Set the local and geodetic position from a projection result.
    pub fn with_position(mut self, local: LocalPosition, geo: GeoPosition) -> Self {
        self.x = local.x;
        self.y = local.y;
        self.lat = geo.lat;
        self.lon = geo.lon;
        self
    }

    /// Mark the object as gone as of `at`.
    pub fn retire(&mut self, at: DateTime<Utc>) {
        self.removed = true;
        self.timestamp = at;
    }

    pub fn is_vehicle(&self) -> bool {
        matches!(self.kind, ObjectKind::Vehicle { .. })
    }
}

/// Format a timestamp the way browser clients produce them (`toISOString`).
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn serialize_timestamp<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format_timestamp(ts))
}

fn serialize_flag<S: Serializer>(flag: &bool, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u8(u8::from(*flag))
}
