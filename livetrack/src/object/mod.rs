//! Tracked object model and row normalization.
//!
//! The event store returns rows in two shapes: generic detections (people,
//! equipment) positioned by a centroid, and vehicle/parking events positioned
//! by a coordinate and carrying vehicle attributes. Both are normalized into a
//! single [`TrackedObject`] whose [`ObjectKind`] says which shape it came from.
//!
//! # Example
//!
//! ```ignore
//! use livetrack::object::{ObjectNormalizer, RowSource, SourcedRow};
//!
//! let normalizer = ObjectNormalizer::new(transform);
//! let sourced = SourcedRow::new(RowSource::Detection, row);
//! let object = normalizer.normalize(&sourced, "garage1", "L1")?;
//! ```

mod model;
mod normalizer;
mod row;

pub use model::{format_timestamp, ObjectKind, ParkingState, TrackedObject};
pub use normalizer::{NormalizeError, ObjectNormalizer};
pub use row::{
    EventInfo, EventRow, ObjectInfo, ParkingSpotInfo, PlaceInfo, Point, RowSource, SensorInfo,
    SourcedRow, VehicleInfo,
};
