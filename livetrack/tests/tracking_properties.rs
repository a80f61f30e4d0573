//! Property tests for object tracking and coordinate projection.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;

use livetrack::coord::{AxisScale, CoordinateTransform, GeoOrigin};
use livetrack::object::{ObjectKind, TrackedObject};
use livetrack::tracker::{ObjectHistory, StateTracker};

const PERIOD_MS: i64 = 1000;
const REMOVAL: Duration = Duration::from_millis(3000);

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

fn observation(id: u8, ms: i64) -> TrackedObject {
    TrackedObject {
        id: format!("obj-{}", id),
        timestamp: base() + chrono::Duration::milliseconds(ms),
        level_id: "L1".to_string(),
        x: 0.0,
        y: 0.0,
        lat: 0.0,
        lon: 0.0,
        orientation: None,
        sensor_type: "Camera".to_string(),
        event_type: "moving".to_string(),
        removed: false,
        kind: ObjectKind::Generic {
            facility_id: "garage1".to_string(),
            tracker_id: None,
            class_id: None,
            class_desc: None,
        },
    }
}

/// Per tick: observations as (id, offset within the tick's window).
fn ticks_strategy() -> impl Strategy<Value = Vec<Vec<(u8, i64)>>> {
    prop::collection::vec(
        prop::collection::vec((0u8..6, 1i64..=PERIOD_MS), 0..6),
        1..15,
    )
}

proptest! {
    #[test]
    fn tracker_output_is_consistent(ticks in ticks_strategy()) {
        let tracker = StateTracker::new(REMOVAL);
        let mut history = ObjectHistory::new();
        let mut last_seen: HashMap<String, DateTime<Utc>> = HashMap::new();
        let mut retired: HashSet<String> = HashSet::new();

        for (index, observations) in ticks.iter().enumerate() {
            let window_start = index as i64 * PERIOD_MS;
            let tick_time = base() + chrono::Duration::milliseconds(window_start + PERIOD_MS);
            let objects: Vec<_> = observations
                .iter()
                .map(|&(id, offset)| observation(id, window_start + offset))
                .collect();

            let out = tracker.track(&mut history, objects, tick_time);

            // At most one entry per id, sorted by timestamp.
            let ids: HashSet<_> = out.objects.iter().map(|o| o.id.clone()).collect();
            prop_assert_eq!(ids.len(), out.objects.len());
            prop_assert!(out.objects.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));

            for object in &out.objects {
                if object.removed {
                    // Retired exactly once until seen again.
                    prop_assert!(retired.insert(object.id.clone()));
                    prop_assert_eq!(object.timestamp, tick_time);
                    prop_assert!(!history.contains(&object.id));
                } else {
                    retired.remove(&object.id);
                    prop_assert!(history.contains(&object.id));
                }
            }

            // History never moves backwards for an id it still holds.
            for (id, entry) in history.iter() {
                if let Some(previous) = last_seen.get(id) {
                    if !retired.contains(id) {
                        prop_assert!(entry.timestamp >= *previous);
                    }
                }
                last_seen.insert(id.to_string(), entry.timestamp);
            }
        }
    }

    #[test]
    fn projection_is_finite(
        lat in -80.0f64..80.0,
        lon in -179.0f64..179.0,
        x in -5000.0f64..5000.0,
        y in -5000.0f64..5000.0,
        x_mult in prop::sample::select(vec![-1.0f64, 1.0]),
        y_mult in prop::sample::select(vec![-1.0f64, 1.0]),
    ) {
        let transform =
            CoordinateTransform::new(GeoOrigin::new(lat, lon), AxisScale::new(x_mult, y_mult));
        let (local, geo) = transform.project(x, y);

        prop_assert_eq!(local.x, x * x_mult);
        prop_assert_eq!(local.y, y * y_mult);
        prop_assert!(geo.lat.is_finite());
        prop_assert!(geo.lon.is_finite());
    }

    #[test]
    fn origin_maps_to_itself(lat in -80.0f64..80.0, lon in -179.0f64..179.0) {
        let transform = CoordinateTransform::new(GeoOrigin::new(lat, lon), AxisScale::identity());
        let (_, geo) = transform.project(0.0, 0.0);
        prop_assert!((geo.lat - lat).abs() < 1e-12);
        prop_assert!((geo.lon - lon).abs() < 1e-12);
    }
}
