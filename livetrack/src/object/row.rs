//! Raw event rows as returned by the event store.
//!
//! Rows mirror the stored event layout: a timestamp plus nested `sensor`,
//! `object`, `event` and (for parking tables) `place` blocks. Partition
//! columns are optional because each table only carries the ones it is keyed
//! on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One stored sensor event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRow {
    /// `<facility>-<level>` partition key (object marker and aisle tables).
    #[serde(rename = "messageid", default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,

    /// Facility partition key (parking tables).
    #[serde(rename = "garageid", default, skip_serializing_if = "Option::is_none")]
    pub facility_id: Option<String>,

    /// Level partition key (parking tables).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Parking spot key (parking playback table).
    #[serde(rename = "spotid", default, skip_serializing_if = "Option::is_none")]
    pub spot_id: Option<String>,

    /// Observation time.
    pub timestamp: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place: Option<PlaceInfo>,

    pub sensor: SensorInfo,

    pub object: ObjectInfo,

    pub event: EventInfo,
}

/// Sensor that produced the event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorInfo {
    /// Sensor type (e.g. `Camera`).
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Detected object block.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ObjectInfo {
    pub id: String,

    #[serde(rename = "trackerid", default, skip_serializing_if = "Option::is_none")]
    pub tracker_id: Option<String>,

    #[serde(rename = "classid", default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<i64>,

    #[serde(rename = "classdesc", default, skip_serializing_if = "Option::is_none")]
    pub class_desc: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<f64>,

    /// Position of generic detections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub centroid: Option<Point>,

    /// Position of vehicles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate: Option<Point>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<VehicleInfo>,
}

/// Planar point in sensor coordinates (metres).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Vehicle attributes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VehicleInfo {
    #[serde(default)]
    pub color: String,

    #[serde(default)]
    pub license: String,

    #[serde(rename = "licensestate", default)]
    pub license_state: String,

    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Location block of parking events.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaceInfo {
    #[serde(rename = "parkingspot", default, skip_serializing_if = "Option::is_none")]
    pub parking_spot: Option<ParkingSpotInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParkingSpotInfo {
    pub id: String,
}

/// Event classification (`enter`, `exit`, `moving`, `parked`, `empty`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventInfo {
    #[serde(rename = "type")]
    pub kind: String,
}

/// Which query produced a row.
///
/// Decides how the row is normalized: detections become generic objects,
/// aisle rows are moving vehicles, parking rows are parked/empty spots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowSource {
    Detection,
    Aisle,
    ParkingSpot,
}

impl RowSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowSource::Detection => "detection",
            RowSource::Aisle => "aisle",
            RowSource::ParkingSpot => "parking_spot",
        }
    }
}

impl std::fmt::Display for RowSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw row tagged with the query that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct SourcedRow {
    pub source: RowSource,
    pub row: EventRow,
}

impl SourcedRow {
    pub fn new(source: RowSource, row: EventRow) -> Self {
        Self { source, row }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_detection_row() {
        let json = r#"{
            "messageid": "garage1-L1",
            "timestamp": "2024-05-01T12:00:00.250Z",
            "sensor": {"type": "Camera", "id": "cam-7"},
            "object": {
                "id": "42",
                "trackerid": "t-42",
                "classid": 2,
                "classdesc": "person",
                "orientation": 90.0,
                "centroid": {"x": 12.5, "y": -3.0}
            },
            "event": {"type": "moving"}
        }"#;

        let row: EventRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.message_id.as_deref(), Some("garage1-L1"));
        assert_eq!(row.sensor.kind, "Camera");
        assert_eq!(row.object.id, "42");
        assert_eq!(row.object.class_id, Some(2));
        assert_eq!(row.object.centroid, Some(Point { x: 12.5, y: -3.0 }));
        assert!(row.object.vehicle.is_none());
        assert_eq!(row.event.kind, "moving");
    }

    #[test]
    fn test_deserialize_parking_row() {
        let json = r#"{
            "garageid": "garage1",
            "level": "L1",
            "spotid": "S-12",
            "timestamp": "2024-05-01T12:00:00Z",
            "place": {"parkingspot": {"id": "S-12"}},
            "sensor": {"type": "Camera"},
            "object": {
                "id": "car-1",
                "coordinate": {"x": 1.0, "y": 2.0},
                "vehicle": {"color": "red", "license": "ABC123", "licensestate": "CA", "type": "sedan"}
            },
            "event": {"type": "parked"}
        }"#;

        let row: EventRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.facility_id.as_deref(), Some("garage1"));
        assert_eq!(row.spot_id.as_deref(), Some("S-12"));
        let vehicle = row.object.vehicle.unwrap();
        assert_eq!(vehicle.license_state, "CA");
        assert_eq!(vehicle.kind, "sedan");
        assert_eq!(row.place.unwrap().parking_spot.unwrap().id, "S-12");
    }

    #[test]
    fn test_row_source_display() {
        assert_eq!(RowSource::Detection.to_string(), "detection");
        assert_eq!(RowSource::ParkingSpot.to_string(), "parking_spot");
    }
}
