//! Per-session object history.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::object::TrackedObject;

/// Last known state of one object.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    /// Observation time of `object`.
    pub timestamp: DateTime<Utc>,
    pub object: TrackedObject,
}

/// Latest observation of every object a session still shows.
///
/// Keyed by object id. Ordered so that retirement sweeps visit objects in a
/// deterministic order.
#[derive(Debug, Default, Clone)]
pub struct ObjectHistory {
    entries: BTreeMap<String, HistoryEntry>,
}

impl ObjectHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&HistoryEntry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Record an observation unless a strictly newer one is already known.
    ///
    /// Equal timestamps overwrite: the later write wins.
    pub fn record(&mut self, object: &TrackedObject) -> bool {
        match self.entries.get(&object.id) {
            Some(existing) if existing.timestamp > object.timestamp => false,
            _ => {
                self.entries.insert(
                    object.id.clone(),
                    HistoryEntry {
                        timestamp: object.timestamp,
                        object: object.clone(),
                    },
                );
                true
            }
        }
    }

    /// Remove and return all entries last seen at least `timeout` before
    /// `now`, in id order.
    pub fn take_stale(
        &mut self,
        now: DateTime<Utc>,
        timeout: std::time::Duration,
    ) -> Vec<HistoryEntry> {
        let stale: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| is_stale(entry.timestamp, now, timeout))
            .map(|(id, _)| id.clone())
            .collect();

        stale
            .into_iter()
            .filter_map(|id| self.entries.remove(&id))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HistoryEntry)> {
        self.entries.iter().map(|(id, entry)| (id.as_str(), entry))
    }
}

/// An entry observed in the future relative to `now` is never stale.
fn is_stale(last_seen: DateTime<Utc>, now: DateTime<Utc>, timeout: std::time::Duration) -> bool {
    match (now - last_seen).to_std() {
        Ok(age) => age >= timeout,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{ObjectKind, TrackedObject};
    use chrono::{Duration, TimeZone};

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap() + Duration::milliseconds(ms)
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

    #[test]
    fn test_record_keeps_newest() {
        let mut history = ObjectHistory::new();
        assert!(history.record(&object("a", 500, 1.0)));
        assert!(!history.record(&object("a", 100, 2.0)));
        assert_eq!(history.get("a").unwrap().object.x, 1.0);
    }

    #[test]
    fn test_record_equal_timestamp_overwrites() {
        let mut history = ObjectHistory::new();
        history.record(&object("a", 500, 1.0));
        assert!(history.record(&object("a", 500, 2.0)));
        assert_eq!(history.get("a").unwrap().object.x, 2.0);
    }

    #[test]
    fn test_take_stale_boundary_is_inclusive() {
        let mut history = ObjectHistory::new();
        history.record(&object("a", 0, 0.0));
        history.record(&object("b", 1, 0.0));

        let stale = history.take_stale(at(5000), std::time::Duration::from_millis(5000));
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].object.id, "a");
        assert!(history.contains("b"));
        assert!(!history.contains("a"));
    }

    #[test]
    fn test_future_entries_are_not_stale() {
        let mut history = ObjectHistory::new();
        history.record(&object("a", 10_000, 0.0));
        assert!(history
            .take_stale(at(0), std::time::Duration::ZERO)
            .is_empty());
    }
}
