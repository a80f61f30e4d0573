//! Object state tracking across ticks
//!
//! Each session keeps an [`ObjectHistory`] with the latest observation of
//! every object it has shown. Once per tick the [`StateTracker`] folds the
//! tick's freshly normalized objects into that history and retires objects
//! that have gone quiet, so that clients are told to drop their markers
//! exactly once.
//!
//! # Per-tick rules
//!
//! - Within one tick, only the newest observation of each id is emitted.
//! - An observation older than the history entry never replaces it.
//! - Equal timestamps: the later write wins.
//! - An object not seen for the removal period (inclusive) is emitted once
//!   more with `removed = 1`, stamped with the tick time, and forgotten.
//! - The emitted list is ordered by timestamp ascending; ties keep the order
//!   in which ids first appeared.

mod history;

pub use history::{HistoryEntry, ObjectHistory};

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::trace;

use crate::object::TrackedObject;

/// Result of tracking one tick.
#[derive(Debug, Clone, Default)]
pub struct TickObjects {
    /// Objects to send, ordered by timestamp.
    pub objects: Vec<TrackedObject>,
    /// How many of them were retired this tick.
    pub retired: usize,
}

/// Dedupes observations and retires stale objects.
#[derive(Debug, Clone, Copy)]
pub struct StateTracker {
    removal_period: Duration,
}

impl StateTracker {
    pub fn new(removal_period: Duration) -> Self {
        Self { removal_period }
    }

    /// Fold `objects` into `history` and compute the tick's output.
    ///
    /// `tick_time` is the logical end of the tick's window.
    pub fn track(
        &self,
        history: &mut ObjectHistory,
        objects: Vec<TrackedObject>,
        tick_time: DateTime<Utc>,
    ) -> TickObjects {
        let mut window = TickWindow::default();

        for object in objects {
            history.record(&object);
            window.keep_newest(object);
        }

        let stale = history.take_stale(tick_time, self.removal_period);
        let retired = stale.len();
        for entry in stale {
            let mut object = entry.object;
            object.retire(tick_time);
            trace!(id = %object.id, "Retiring object");
            window.replace(object);
        }

        TickObjects {
            objects: window.into_sorted(),
            retired,
        }
    }
}

/// The tick's output, one slot per id in order of first appearance.
#[derive(Debug, Default)]
struct TickWindow {
    slots: Vec<TrackedObject>,
    positions: HashMap<String, usize>,
}

impl TickWindow {
    /// Keep `object` unless the slot already holds a strictly newer one.
    fn keep_newest(&mut self, object: TrackedObject) {
        match self.positions.get(&object.id) {
            Some(&index) => {
                if object.timestamp >= self.slots[index].timestamp {
                    self.slots[index] = object;
                }
            }
            None => self.push(object),
        }
    }

    /// Unconditionally replace the slot for `object.id`.
    fn replace(&mut self, object: TrackedObject) {
        match self.positions.get(&object.id) {
            Some(&index) => self.slots[index] = object,
            None => self.push(object),
        }
    }

    fn push(&mut self, object: TrackedObject) {
        self.positions.insert(object.id.clone(), self.slots.len());
        self.slots.push(object);
    }

    fn into_sorted(self) -> Vec<TrackedObject> {
        let mut objects = self.slots;
        // Stable: ties keep first-appearance order.
        objects.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        objects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectKind;
    use chrono::TimeZone;

    const REMOVAL: Duration = Duration::from_millis(5000);

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap() + chrono::Duration::milliseconds(ms)
    }

    fn object(id: &str, ms: i64, x: f64) -> TrackedObject {
        TrackedObject {
            id: id.to_string(),
            timestamp: at(ms),
            level_id: "L1".to_string(),
            x,
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

    fn ids(objects: &[TrackedObject]) -> Vec<&str> {
        objects.iter().map(|o| o.id.as_str()).collect()
    }

    mod dedupe {
        use super::*;

        #[test]
        fn test_single_object_passes_through() {
            let tracker = StateTracker::new(REMOVAL);
            let mut history = ObjectHistory::new();

            let out = tracker.track(&mut history, vec![object("42", 500, 10.0)], at(1000));
            assert_eq!(out.objects.len(), 1);
            assert_eq!(out.retired, 0);
            assert!(!out.objects[0].removed);
            assert!(history.contains("42"));
        }

        #[test]
        fn test_newest_observation_wins_within_tick() {
            let tracker = StateTracker::new(REMOVAL);
            let mut history = ObjectHistory::new();

            let out = tracker.track(
                &mut history,
                vec![object("a", 800, 2.0), object("a", 200, 1.0)],
                at(1000),
            );
            assert_eq!(out.objects.len(), 1);
            assert_eq!(out.objects[0].x, 2.0);
            assert_eq!(history.get("a").unwrap().timestamp, at(800));
        }

        #[test]
        fn test_equal_timestamps_later_write_wins() {
            let tracker = StateTracker::new(REMOVAL);
            let mut history = ObjectHistory::new();

            let out = tracker.track(
                &mut history,
                vec![object("a", 500, 1.0), object("a", 500, 2.0)],
                at(1000),
            );
            assert_eq!(out.objects.len(), 1);
            assert_eq!(out.objects[0].x, 2.0);
        }

        #[test]
        fn test_output_sorted_with_stable_ties() {
            let tracker = StateTracker::new(REMOVAL);
            let mut history = ObjectHistory::new();

            let out = tracker.track(
                &mut history,
                vec![
                    object("late", 900, 0.0),
                    object("tie-1", 300, 0.0),
                    object("tie-2", 300, 0.0),
                    object("early", 100, 0.0),
                ],
                at(1000),
            );
            assert_eq!(ids(&out.objects), vec!["early", "tie-1", "tie-2", "late"]);
        }

        #[test]
        fn test_history_not_regressed_by_older_observation() {
            let tracker = StateTracker::new(REMOVAL);
            let mut history = ObjectHistory::new();
            tracker.track(&mut history, vec![object("a", 900, 1.0)], at(1000));

            // A late-arriving older row is still emitted but does not rewind history.
            let out = tracker.track(&mut history, vec![object("a", 100, 0.0)], at(2000));
            assert_eq!(out.objects.len(), 1);
            assert_eq!(history.get("a").unwrap().timestamp, at(900));
        }
    }

    mod retirement {
        use super::*;

        #[test]
        fn test_retired_once_at_boundary() {
            let tracker = StateTracker::new(REMOVAL);
            let mut history = ObjectHistory::new();
            tracker.track(&mut history, vec![object("a", 0, 1.0)], at(1000));

            let quiet = tracker.track(&mut history, Vec::new(), at(4999));
            assert!(quiet.objects.is_empty());

            let out = tracker.track(&mut history, Vec::new(), at(5000));
            assert_eq!(out.retired, 1);
            assert_eq!(out.objects.len(), 1);
            assert!(out.objects[0].removed);
            assert_eq!(out.objects[0].timestamp, at(5000));
            assert_eq!(out.objects[0].x, 1.0);
            assert!(history.is_empty());

            let after = tracker.track(&mut history, Vec::new(), at(6000));
            assert!(after.objects.is_empty());
        }

        #[test]
        fn test_stale_observation_in_tick_is_emitted_as_removal() {
            let tracker = StateTracker::new(REMOVAL);
            let mut history = ObjectHistory::new();

            let out = tracker.track(&mut history, vec![object("old", 0, 3.0)], at(6000));
            assert_eq!(out.objects.len(), 1);
            assert!(out.objects[0].removed);
            assert_eq!(out.objects[0].x, 3.0);
            assert!(!history.contains("old"));
        }

        #[test]
        fn test_reappearing_object_is_tracked_again() {
            let tracker = StateTracker::new(REMOVAL);
            let mut history = ObjectHistory::new();
            tracker.track(&mut history, vec![object("a", 0, 0.0)], at(1000));
            tracker.track(&mut history, Vec::new(), at(5000));

            let out = tracker.track(&mut history, vec![object("a", 7000, 0.0)], at(7500));
            assert_eq!(out.objects.len(), 1);
            assert!(!out.objects[0].removed);
            assert!(history.contains("a"));
        }
    }
}
