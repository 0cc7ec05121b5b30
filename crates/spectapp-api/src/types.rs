//! Spect'App API response types.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SpectAppError;
use crate::util::parse_show_datetime;

/// `status` value of a successful response.
const SUCCESS_STATUS: &str = "success";

/// Message used when a failed response carries no `error` field.
const UNKNOWN_ERROR: &str = "unknown error";

/// A show record, exactly as returned by the server.
///
/// The schema is server-defined, so the record is kept as a JSON object.
/// Accessors never fail on absent fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Show(Map<String, Value>);

impl Show {
    /// Returns the raw value of `field`, if present.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns the show `id` rendered as a string (the server may send a number or a string).
    #[must_use]
    pub fn id(&self) -> Option<String> {
        match self.0.get("id")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Returns the show `title`, if it is a string.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.0.get("title").and_then(Value::as_str)
    }

    /// Borrows the underlying JSON object.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consumes the show, returning the underlying JSON object.
    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Show {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// One page of shows from the `shows` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowPage {
    /// Shows on this page.
    pub shows: Vec<Show>,
    /// Total number of matching shows across all pages.
    #[serde(rename = "results")]
    pub total: u64,
}

/// Full payload of the `show` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowDetails {
    /// The show record.
    pub show: Show,
    /// Icon image URL.
    pub icon: String,
    /// Header image URL.
    pub header: String,
}

/// A performance date of a show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowDate {
    /// Start of the performance (wall-clock time as sent by the server).
    pub datetime: NaiveDateTime,
    /// UTC offset sent with `datetime`, if the server included one.
    pub offset: Option<FixedOffset>,
    /// Venue name.
    pub place: String,
}

impl ShowDate {
    /// Returns the start as an absolute instant, when an offset was sent.
    #[must_use]
    pub fn instant(&self) -> Option<DateTime<FixedOffset>> {
        self.offset
            .and_then(|offset| offset.from_local_datetime(&self.datetime).single())
    }
}

/// Media image attached to a show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Square icon.
    Icon,
    /// Wide header banner.
    Header,
}

impl MediaKind {
    /// Payload field and static path segment for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Icon => "icon",
            Self::Header => "header",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Wire-level payloads ---

/// Common response envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    status: String,
    #[serde(default)]
    error: Option<Value>,
    #[serde(flatten)]
    payload: Map<String, Value>,
}

impl Envelope {
    /// Checks `status` and deserializes the remaining fields into `T`.
    pub(crate) fn into_payload<T: DeserializeOwned>(
        self,
        endpoint: &str,
    ) -> Result<T, SpectAppError> {
        if self.status != SUCCESS_STATUS {
            let message = match self.error {
                Some(Value::String(s)) => s,
                Some(Value::Null) | None => String::from(UNKNOWN_ERROR),
                Some(other) => other.to_string(),
            };
            return Err(SpectAppError::Api { message });
        }

        serde_json::from_value(Value::Object(self.payload))
            .map_err(|e| SpectAppError::invalid_response(endpoint, e.to_string()))
    }
}

/// `show` field of the `show` endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct ShowPayload {
    pub show: Show,
}

/// `icon` field of the `show` endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct IconPayload {
    pub icon: String,
}

/// `header` field of the `show` endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct HeaderPayload {
    pub header: String,
}

/// Payload of the `dates` endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct DatesPayload {
    pub dates: Vec<RawShowDate>,
}

/// One entry of `dates`, before datetime parsing.
#[derive(Debug, Deserialize)]
pub(crate) struct RawShowDate {
    pub datetime: String,
    pub place: String,
}

impl RawShowDate {
    /// Parses the ISO-8601 `datetime` into a [`ShowDate`].
    pub(crate) fn into_show_date(self, endpoint: &str) -> Result<ShowDate, SpectAppError> {
        let (datetime, offset) = parse_show_datetime(&self.datetime).ok_or_else(|| {
            SpectAppError::invalid_response(
                endpoint,
                format!("invalid datetime: {:?}", self.datetime),
            )
        })?;
        Ok(ShowDate {
            datetime,
            offset,
            place: self.place,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;
    use crate::error::ErrorKind;

    fn envelope(value: &Value) -> Envelope {
        serde_json::from_value(value.clone()).unwrap()
    }

    #[test]
    fn test_show_accessors() {
        // Arrange
        let show: Show =
            serde_json::from_value(json!({"id": 128, "title": "Rollmops", "tags": []})).unwrap();

        // Act & Assert
        assert_eq!(show.id().as_deref(), Some("128"));
        assert_eq!(show.title(), Some("Rollmops"));
        assert_eq!(show.get("tags"), Some(&json!([])));
        assert!(show.get("missing").is_none());
    }

    #[test]
    fn test_show_id_string() {
        // Arrange
        let show: Show = serde_json::from_value(json!({"id": "a12"})).unwrap();

        // Act & Assert
        assert_eq!(show.id().as_deref(), Some("a12"));
        assert!(show.title().is_none());
    }

    #[test]
    fn test_show_serializes_transparently() {
        // Arrange
        let raw = json!({"id": 1, "title": "x", "nested": {"a": [1, 2]}});
        let show: Show = serde_json::from_value(raw.clone()).unwrap();

        // Act
        let back = serde_json::to_value(&show).unwrap();

        // Assert
        assert_eq!(back, raw);
    }

    #[test]
    fn test_media_kind_as_str() {
        // Arrange & Act & Assert
        assert_eq!(MediaKind::Icon.as_str(), "icon");
        assert_eq!(MediaKind::Header.to_string(), "header");
    }

    #[test]
    fn test_envelope_success_into_page() {
        // Arrange
        let env = envelope(&json!({
            "status": "success",
            "shows": [{"id": 1}, {"id": 2}],
            "results": 42
        }));

        // Act
        let page: ShowPage = env.into_payload("shows").unwrap();

        // Assert
        assert_eq!(page.shows.len(), 2);
        assert_eq!(page.total, 42);
        assert_eq!(page.shows[1].id().as_deref(), Some("2"));
    }

    #[test]
    fn test_envelope_failure_uses_error_message() {
        // Arrange
        let env = envelope(&json!({"status": "error", "error": "bad festival"}));

        // Act
        let err = env.into_payload::<ShowPage>("shows").unwrap_err();

        // Assert
        assert_eq!(err.kind(), ErrorKind::Application);
        assert!(err.to_string().contains("bad festival"));
    }

    #[test]
    fn test_envelope_failure_without_message() {
        // Arrange
        let env = envelope(&json!({"status": "error"}));

        // Act
        let err = env.into_payload::<ShowPage>("shows").unwrap_err();

        // Assert
        assert!(err.to_string().contains(UNKNOWN_ERROR));
    }

    #[test]
    fn test_envelope_missing_field_is_invalid_response() {
        // Arrange
        let env = envelope(&json!({"status": "success", "shows": []}));

        // Act
        let err = env.into_payload::<ShowPage>("shows").unwrap_err();

        // Assert
        assert!(matches!(err, SpectAppError::InvalidResponse { .. }));
        assert!(err.to_string().contains("results"));
    }

    #[test]
    fn test_raw_show_date_parses() {
        // Arrange
        let raw = RawShowDate {
            datetime: String::from("2024-07-20T19:00:00"),
            place: String::from("Main Stage"),
        };

        // Act
        let date = raw.into_show_date("dates").unwrap();

        // Assert
        let expected = NaiveDate::from_ymd_opt(2024, 7, 20)
            .unwrap()
            .and_hms_opt(19, 0, 0)
            .unwrap();
        assert_eq!(date.datetime, expected);
        assert!(date.offset.is_none());
        assert!(date.instant().is_none());
        assert_eq!(date.place, "Main Stage");
    }

    #[test]
    fn test_raw_show_date_keeps_offset() {
        // Arrange
        let paris = RawShowDate {
            datetime: String::from("2024-07-20T19:00:00+02:00"),
            place: String::from("Main Stage"),
        };
        let utc = RawShowDate {
            datetime: String::from("2024-07-20T17:00:00Z"),
            place: String::from("Main Stage"),
        };

        // Act
        let paris = paris.into_show_date("dates").unwrap();
        let utc = utc.into_show_date("dates").unwrap();

        // Assert
        assert_eq!(paris.offset, FixedOffset::east_opt(2 * 3600));
        assert_ne!(paris, utc);
        assert_eq!(paris.instant(), utc.instant());
        assert_eq!(
            paris.instant().unwrap().to_rfc3339(),
            "2024-07-20T19:00:00+02:00"
        );
    }

    #[test]
    fn test_raw_show_date_invalid() {
        // Arrange
        let raw = RawShowDate {
            datetime: String::from("tomorrow evening"),
            place: String::from("Main Stage"),
        };

        // Act
        let err = raw.into_show_date("dates").unwrap_err();

        // Assert
        assert_eq!(err.kind(), ErrorKind::Application);
        assert!(err.to_string().contains("tomorrow evening"));
    }
}
