//! Row to [`TrackedObject`] normalization.

use thiserror::Error;

use super::model::{ObjectKind, ParkingState, TrackedObject};
use super::row::{EventRow, RowSource, SourcedRow};
use crate::coord::CoordinateTransform;

/// Event types that mean the object left the map.
const REMOVAL_EVENTS: [&str; 2] = ["exit", "empty"];

/// Errors raised while normalizing a row.
#[derive(Debug, Error, PartialEq)]
pub enum NormalizeError {
    /// A field required for this kind of row is absent.
    #[error("object {id}: missing {field}")]
    MissingField { id: String, field: &'static str },

    /// A parking row whose event type is neither `parked` nor `empty`.
    #[error("object {id}: unexpected parking event type '{event_type}'")]
    UnexpectedParkingEvent { id: String, event_type: String },
}

/// Maps raw event rows onto the canonical object representation.
#[derive(Debug, Clone, Copy)]
pub struct ObjectNormalizer {
    transform: CoordinateTransform,
}

impl ObjectNormalizer {
    pub fn new(transform: CoordinateTransform) -> Self {
        Self { transform }
    }

    pub fn transform(&self) -> &CoordinateTransform {
        &self.transform
    }

    /// Normalize a row according to the query that produced it.
    pub fn normalize(
        &self,
        sourced: &SourcedRow,
        facility_id: &str,
        level_id: &str,
    ) -> Result<TrackedObject, NormalizeError> {
        match sourced.source {
            RowSource::Detection => self.normalize_detection(&sourced.row, facility_id, level_id),
            RowSource::Aisle => {
                self.normalize_parking_event(&sourced.row, ParkingState::Moving, level_id)
            }
            RowSource::ParkingSpot => self.normalize_parking_row(&sourced.row, level_id),
        }
    }

    /// Normalize a generic detection (position taken from `object.centroid`).
    pub fn normalize_detection(
        &self,
        row: &EventRow,
        facility_id: &str,
        level_id: &str,
    ) -> Result<TrackedObject, NormalizeError> {
        let centroid = required(row, row.object.centroid, "object.centroid")?;

        let object = base_object(row, level_id, ObjectKind::Generic {
            facility_id: facility_id.to_string(),
            tracker_id: row.object.tracker_id.clone(),
            class_id: row.object.class_id,
            class_desc: row.object.class_desc.clone(),
        });

        let (local, geo) = self.transform.project(centroid.x, centroid.y);
        Ok(object.with_position(local, geo))
    }

    /// Normalize a vehicle event in the given parking state (position taken
    /// from `object.coordinate`).
    ///
    /// `removed` is set for `exit` and `empty` events. The parking spot id is
    /// only read for parked/empty states.
    pub fn normalize_parking_event(
        &self,
        row: &EventRow,
        state: ParkingState,
        level_id: &str,
    ) -> Result<TrackedObject, NormalizeError> {
        let coordinate = required(row, row.object.coordinate, "object.coordinate")?;
        let vehicle = required(row, row.object.vehicle.as_ref(), "object.vehicle")?;

        let parking_spot_id = if state.has_spot() {
            let spot = row.place.as_ref().and_then(|p| p.parking_spot.as_ref());
            required(row, spot, "place.parkingspot.id")?.id.clone()
        } else {
            String::new()
        };

        let mut object = base_object(row, level_id, ObjectKind::Vehicle {
            color: vehicle.color.clone(),
            license_plate: vehicle.license.clone(),
            license_state: vehicle.license_state.clone(),
            vehicle_type: vehicle.kind.clone(),
            state,
            parking_spot_id,
        });
        object.removed = REMOVAL_EVENTS.contains(&row.event.kind.as_str());

        let (local, geo) = self.transform.project(coordinate.x, coordinate.y);
        Ok(object.with_position(local, geo))
    }

    /// Normalize a parking spot row, deriving the state from its event type.
    ///
    /// Only `parked` and `empty` rows describe a spot; anything else is
    /// reported as [`NormalizeError::UnexpectedParkingEvent`] so the caller
    /// can drop and log it.
    pub fn normalize_parking_row(
        &self,
        row: &EventRow,
        level_id: &str,
    ) -> Result<TrackedObject, NormalizeError> {
        let state = match row.event.kind.as_str() {
            "parked" => ParkingState::Parked,
            "empty" => ParkingState::Empty,
            other => {
                return Err(NormalizeError::UnexpectedParkingEvent {
                    id: row.object.id.clone(),
                    event_type: other.to_string(),
                })
            }
        };
        self.normalize_parking_event(row, state, level_id)
    }
}

fn required<T>(row: &EventRow, value: Option<T>, field: &'static str) -> Result<T, NormalizeError> {
    value.ok_or_else(|| NormalizeError::MissingField {
        id: row.object.id.clone(),
        field,
    })
}

fn base_object(row: &EventRow, level_id: &str, kind: ObjectKind) -> TrackedObject {
    TrackedObject {
        id: row.object.id.clone(),
        timestamp: row.timestamp,
        level_id: level_id.to_string(),
        x: 0.0,
        y: 0.0,
        lat: 0.0,
        lon: 0.0,
        orientation: row.object.orientation,
        sensor_type: row.sensor.kind.clone(),
        event_type: row.event.kind.clone(),
        removed: false,
        kind,
    }
}
