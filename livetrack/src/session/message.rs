//! Outbound message shapes.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::object::{format_timestamp, TrackedObject};

/// Default bound on payload renderings written to the log.
pub const DEFAULT_LOG_PAYLOAD_LIMIT: usize = 2000;

const ELLIPSIS: &str = " ...";

/// One tick's update.
#[derive(Debug, Clone, Serialize)]
pub struct TickMessage {
    pub metadata: TickMetadata,
    pub data: TickData,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickMetadata {
    pub timestamp: String,
    pub garage_level: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TickData {
    pub timestamp: String,
    pub objects: Vec<TrackedObject>,
    /// Reserved by map clients; always empty.
    pub markers: Vec<serde_json::Value>,
}

impl TickMessage {
    pub fn new(tick: DateTime<Utc>, level_id: &str, objects: Vec<TrackedObject>) -> Self {
        let timestamp = format_timestamp(&tick);
        Self {
            metadata: TickMetadata {
                timestamp: timestamp.clone(),
                garage_level: level_id.to_string(),
            },
            data: TickData {
                timestamp,
                objects,
                markers: Vec::new(),
            },
        }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Error reply sent instead of ticks when a session cannot start.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorMessage {
    pub error: String,
}

impl ErrorMessage {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Bound `text` to `limit` bytes for logging.
///
/// Longer text keeps its first `limit - 4` bytes (rounded down to a character
/// boundary) followed by `" ..."`.
pub fn truncate_for_log(text: &str, limit: usize) -> Cow<'_, str> {
    if text.len() <= limit {
        return Cow::Borrowed(text);
    }
    let mut cut = limit.saturating_sub(ELLIPSIS.len());
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    Cow::Owned(format!("{}{}", &text[..cut], ELLIPSIS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_empty_tick_shape() {
        let tick = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&TickMessage::new(tick, "L1", Vec::new()).encode().unwrap())
                .unwrap();

        assert_eq!(json["metadata"]["timestamp"], "2024-05-01T12:00:00.000Z");
        assert_eq!(json["metadata"]["garageLevel"], "L1");
        assert_eq!(json["data"]["timestamp"], "2024-05-01T12:00:00.000Z");
        assert_eq!(json["data"]["objects"], serde_json::json!([]));
        assert_eq!(json["data"]["markers"], serde_json::json!([]));
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            ErrorMessage::new("Invalid Timestamp").encode().unwrap(),
            r#"{"error":"Invalid Timestamp"}"#
        );
    }

    #[test]
    fn test_truncate_short_text_is_untouched() {
        assert!(matches!(truncate_for_log("abc", 2000), Cow::Borrowed("abc")));
        let exact = "x".repeat(2000);
        assert_eq!(truncate_for_log(&exact, 2000).len(), 2000);
    }

    #[test]
    fn test_truncate_long_text() {
        let long = "x".repeat(2001);
        let out = truncate_for_log(&long, 2000);
        assert_eq!(out.len(), 2000);
        assert!(out.ends_with("x ..."));
        assert_eq!(&out[..1996], &long[..1996]);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let text = "é".repeat(10);
        let out = truncate_for_log(&text, 9);
        assert!(out.ends_with(" ..."));
        assert!(out.len() <= 9);
    }
}
