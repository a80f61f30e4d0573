//! Coordinate conversion module
//!
//! Converts local planar sensor coordinates (metres relative to a facility
//! origin) into geographic latitude/longitude for map clients.
//!
//! The projection is an equirectangular approximation: metres are turned into
//! degrees using a fixed Earth circumference, and the longitude scale is
//! corrected by the cosine of the mean latitude between the origin and the
//! object. Over the extent of a single facility the error is negligible.

mod types;

pub use types::{AxisScale, GeoOrigin, GeoPosition, LocalPosition};

use std::f64::consts::PI;

/// Earth circumference used for the metres-to-degrees conversion, in kilometres.
pub const EARTH_CIRCUMFERENCE_KM: f64 = 40_000.0;

/// Degrees spanned by one local metre along a meridian.
const DEGREES_PER_METRE: f64 = 360.0 * 0.001 / EARTH_CIRCUMFERENCE_KM;

/// Projects facility-local coordinates onto latitude/longitude.
///
/// Axis multipliers are applied first (sensors may report with a flipped or
/// scaled axis), then the scaled position is projected relative to the
/// configured origin.
///
/// # Example
///
/// ```
/// use livetrack::coord::{AxisScale, CoordinateTransform, GeoOrigin};
///
/// let transform = CoordinateTransform::new(GeoOrigin::new(37.0, -121.0), AxisScale::identity());
/// let (local, geo) = transform.project(10.0, 20.0);
/// assert_eq!(local.x, 10.0);
/// assert!(geo.lat < 37.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTransform {
    origin: GeoOrigin,
    scale: AxisScale,
}

impl CoordinateTransform {
    /// Create a transform for the given origin and axis multipliers.
    pub fn new(origin: GeoOrigin, scale: AxisScale) -> Self {
        Self { origin, scale }
    }

    /// The geodetic origin of the facility.
    pub fn origin(&self) -> GeoOrigin {
        self.origin
    }

    /// The axis multipliers applied before projection.
    pub fn scale(&self) -> AxisScale {
        self.scale
    }

    /// Latitude of a point `local_y` metres from the origin.
    #[inline]
    pub fn to_latitude(&self, local_y: f64) -> f64 {
        self.origin.lat - local_y * DEGREES_PER_METRE
    }

    /// Longitude of a point `local_x` metres from the origin at latitude `lat`.
    #[inline]
    pub fn to_longitude(&self, local_x: f64, lat: f64) -> f64 {
        let mean_lat_rad = (self.origin.lat + lat) * PI / 360.0;
        self.origin.lon - local_x * DEGREES_PER_METRE / mean_lat_rad.cos()
    }

    /// Scale a raw sensor position and project it.
    ///
    /// Returns the scaled local position (what clients see as `x`/`y`) and the
    /// derived geodetic position.
    pub fn project(&self, raw_x: f64, raw_y: f64) -> (LocalPosition, GeoPosition) {
        let local = self.scale.apply(raw_x, raw_y);
        let lat = self.to_latitude(local.y);
        let lon = self.to_longitude(local.x, lat);
        (local, GeoPosition { lat, lon })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform() -> CoordinateTransform {
        CoordinateTransform::new(GeoOrigin::new(37.3861, -121.9635), AxisScale::identity())
    }

    #[test]
    fn test_origin_maps_to_itself() {
        let t = transform();
        let (_, geo) = t.project(0.0, 0.0);
        assert!((geo.lat - 37.3861).abs() < 1e-12);
        assert!((geo.lon - (-121.9635)).abs() < 1e-12);
    }

    #[test]
    fn test_latitude_one_kilometre() {
        // 1km along the y axis is 360/40000 = 0.009 degrees
        let t = transform();
        let lat = t.to_latitude(1000.0);
        assert!((lat - (37.3861 - 0.009)).abs() < 1e-9);
    }

    #[test]
    fn test_longitude_uses_mean_latitude_cosine() {
        let t = transform();
        let lat = t.to_latitude(500.0);
        let lon = t.to_longitude(1000.0, lat);

        let mean = (37.3861 + lat) * PI / 360.0;
        let expected = -121.9635 - 0.009 / mean.cos();
        assert!((lon - expected).abs() < 1e-9);
    }

    #[test]
    fn test_axis_multipliers_applied_before_projection() {
        let flipped = CoordinateTransform::new(
            GeoOrigin::new(37.3861, -121.9635),
            AxisScale::new(-1.0, -1.0),
        );
        let (local, geo) = flipped.project(10.0, 20.0);
        assert_eq!(local.x, -10.0);
        assert_eq!(local.y, -20.0);
        // Negative y moves north of the origin
        assert!(geo.lat > 37.3861);
        assert!(geo.lon > -121.9635);
    }

    #[test]
    fn test_projection_is_deterministic() {
        let t = transform();
        assert_eq!(t.project(123.4, -56.7), t.project(123.4, -56.7));
    }
}
