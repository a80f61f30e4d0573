//! Coordinate types

use serde::{Deserialize, Serialize};

/// Geodetic origin of a facility's local coordinate frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoOrigin {
    /// Latitude of the local (0, 0) point in degrees
    pub lat: f64,
    /// Longitude of the local (0, 0) point in degrees
    pub lon: f64,
}

impl GeoOrigin {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Sign/scale multipliers applied to raw sensor axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisScale {
    pub x: f64,
    pub y: f64,
}

impl AxisScale {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Multipliers that leave coordinates untouched.
    pub fn identity() -> Self {
        Self { x: 1.0, y: 1.0 }
    }

    /// Apply the multipliers to a raw position.
    #[inline]
    pub fn apply(&self, raw_x: f64, raw_y: f64) -> LocalPosition {
        LocalPosition {
            x: raw_x * self.x,
            y: raw_y * self.y,
        }
    }
}

impl Default for AxisScale {
    fn default() -> Self {
        Self::identity()
    }
}

/// Position in the facility's local frame, in metres (after axis scaling).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LocalPosition {
    pub x: f64,
    pub y: f64,
}

/// Geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPosition {
    pub lat: f64,
    pub lon: f64,
}
