//! Session open request.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

use super::error::InputError;

/// First message a client sends on a new connection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRequest {
    #[serde(default)]
    start_timestamp: Option<serde_json::Value>,
    facility_id: String,
    level_id: String,
}

/// A validated open request.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRequest {
    /// Logical time of the session's first window end.
    pub start: DateTime<Utc>,
    pub facility_id: String,
    pub level_id: String,
}

impl SessionRequest {
    pub fn new(
        start: DateTime<Utc>,
        facility_id: impl Into<String>,
        level_id: impl Into<String>,
    ) -> Self {
        Self {
            start,
            facility_id: facility_id.into(),
            level_id: level_id.into(),
        }
    }

    /// Parse and validate a request frame.
    ///
    /// A missing, `null` or non-string `startTimestamp` is an invalid
    /// timestamp, not a malformed request.
    pub fn parse(text: &str) -> Result<Self, InputError> {
        let raw: RawRequest = serde_json::from_str(text)?;
        let start = match raw.start_timestamp {
            Some(serde_json::Value::String(text)) => {
                parse_timestamp(&text).ok_or(InputError::InvalidTimestamp(text))?
            }
            Some(other) => return Err(InputError::InvalidTimestamp(other.to_string())),
            None => return Err(InputError::InvalidTimestamp(String::new())),
        };
        Ok(Self {
            start,
            facility_id: raw.facility_id,
            level_id: raw.level_id,
        })
    }
}

/// Parse an ISO-8601 timestamp.
///
/// Accepts RFC 3339 with an offset, a date-time without offset (read as
/// UTC), or a bare date (midnight UTC).
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_valid_request() {
        let request = SessionRequest::parse(
            r#"{"startTimestamp":"2024-05-01T12:00:00.000Z","facilityId":"garage1","levelId":"L1"}"#,
        )
        .unwrap();
        assert_eq!(request.start, Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
        assert_eq!(request.facility_id, "garage1");
        assert_eq!(request.level_id, "L1");
    }

    #[test]
    fn test_invalid_timestamp() {
        let err = SessionRequest::parse(
            r#"{"startTimestamp":"not-a-date","facilityId":"garage1","levelId":"L1"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, InputError::InvalidTimestamp(ref s) if s == "not-a-date"));
    }

    #[test]
    fn test_missing_or_non_string_timestamp_is_invalid_timestamp() {
        for frame in [
            r#"{"facilityId":"g","levelId":"1"}"#,
            r#"{"startTimestamp":null,"facilityId":"g","levelId":"1"}"#,
            r#"{"startTimestamp":12,"facilityId":"g","levelId":"1"}"#,
            r#"{"startTimestamp":{"at":"now"},"facilityId":"g","levelId":"1"}"#,
        ] {
            let err = SessionRequest::parse(frame).unwrap_err();
            assert!(matches!(err, InputError::InvalidTimestamp(_)), "{}", frame);
            assert_eq!(err.to_string(), "Invalid Timestamp");
        }
    }

    #[test]
    fn test_malformed_request() {
        assert!(matches!(
            SessionRequest::parse("{\"facilityId\": \"garage1\"}"),
            Err(InputError::Malformed(_))
        ));
        assert!(matches!(
            SessionRequest::parse("hello"),
            Err(InputError::Malformed(_))
        ));
        assert!(matches!(
            SessionRequest::parse(r#"["2024-05-01T12:00:00Z","g","1"]"#),
            Err(InputError::Malformed(_))
        ));
        assert!(matches!(
            SessionRequest::parse(r#"{"startTimestamp":"2024-05-01T12:00:00Z","levelId":"1"}"#),
            Err(InputError::Malformed(_))
        ));
    }

    #[test]
    fn test_timestamp_formats() {
        let noon = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-05-01T14:00:00+02:00"), Some(noon));
        assert_eq!(parse_timestamp("2024-05-01T12:00:00"), Some(noon));
        assert_eq!(
            parse_timestamp("2024-05-01"),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp(""), None);
    }
}
