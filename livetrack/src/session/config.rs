//! Stream configuration shared by all sessions.

use std::time::Duration;

use super::message::DEFAULT_LOG_PAYLOAD_LIMIT;
use crate::coord::{AxisScale, CoordinateTransform, GeoOrigin};
use crate::orchestrator::SourceConfig;

/// Default interval between ticks.
pub const DEFAULT_SEND_PERIOD: Duration = Duration::from_millis(1000);

/// Default quiet time after which an object is retired.
pub const DEFAULT_REMOVAL_PERIOD: Duration = Duration::from_millis(5000);

/// Configuration for streaming sessions.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamConfig {
    /// Interval between ticks; also the length of the first window.
    pub send_period: Duration,

    /// Quiet time after which an object is retired.
    pub removal_period: Duration,

    /// Geodetic anchor of the local frame.
    pub origin: GeoOrigin,

    /// Multipliers applied to raw local coordinates.
    pub axis_scale: AxisScale,

    /// Which tables each tick reads.
    pub sources: SourceConfig,

    /// Bound on payload renderings written to the log.
    pub log_payload_limit: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            send_period: DEFAULT_SEND_PERIOD,
            removal_period: DEFAULT_REMOVAL_PERIOD,
            origin: GeoOrigin::new(0.0, 0.0),
            axis_scale: AxisScale::identity(),
            sources: SourceConfig::default(),
            log_payload_limit: DEFAULT_LOG_PAYLOAD_LIMIT,
        }
    }
}

impl StreamConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_send_period(mut self, period: Duration) -> Self {
        self.send_period = period;
        self
    }

    pub fn with_removal_period(mut self, period: Duration) -> Self {
        self.removal_period = period;
        self
    }

    pub fn with_origin(mut self, origin: GeoOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_axis_scale(mut self, scale: AxisScale) -> Self {
        self.axis_scale = scale;
        self
    }

    pub fn with_sources(mut self, sources: SourceConfig) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_log_payload_limit(mut self, limit: usize) -> Self {
        self.log_payload_limit = limit;
        self
    }

    pub fn transform(&self) -> CoordinateTransform {
        CoordinateTransform::new(self.origin, self.axis_scale)
    }
}
