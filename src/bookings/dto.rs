use serde::{de, Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

use crate::fields::{Fields, Value};

/// Request body for `POST /booking`. Timestamps are RFC 3339.
#[derive(Debug, Default, Deserialize)]
pub struct CreateBookingRequest {
    pub user_id: Option<i64>,
    #[serde(default, deserialize_with = "rfc3339_micros")]
    pub start_time: Option<OffsetDateTime>,
    #[serde(default, deserialize_with = "rfc3339_micros")]
    pub end_time: Option<OffsetDateTime>,
    pub note: Option<String>,
}

/// Request body for `PUT /booking/{id}`. `None` means "leave unchanged".
#[derive(Debug, Default, Deserialize)]
pub struct BookingPatch {
    pub user_id: Option<i64>,
    #[serde(default, deserialize_with = "rfc3339_micros")]
    pub start_time: Option<OffsetDateTime>,
    #[serde(default, deserialize_with = "rfc3339_micros")]
    pub end_time: Option<OffsetDateTime>,
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedBooking {
    pub id: i64,
}

/// RFC 3339 timestamp truncated to the microsecond precision of `TIMESTAMPTZ`.
fn rfc3339_micros<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(t) = time::serde::rfc3339::option::deserialize(deserializer)? else {
        return Ok(None);
    };
    t.replace_nanosecond(t.nanosecond() / 1_000 * 1_000)
        .map(Some)
        .map_err(de::Error::custom)
}

impl Fields for CreateBookingRequest {
    fn field(&self, name: &str) -> Option<Value<'_>> {
        match name {
            "user_id" => self.user_id.map(Value::Int),
            "start_time" => self.start_time.map(Value::Time),
            "end_time" => self.end_time.map(Value::Time),
            "note" => self.note.as_deref().map(Value::Text),
            _ => None,
        }
    }
}

impl Fields for BookingPatch {
    fn field(&self, name: &str) -> Option<Value<'_>> {
        match name {
            "user_id" => self.user_id.map(Value::Int),
            "start_time" => self.start_time.map(Value::Time),
            "end_time" => self.end_time.map(Value::Time),
            "note" => self.note.as_deref().map(Value::Text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn parses_rfc3339_times() {
        let req: CreateBookingRequest = serde_json::from_str(
            r#"{"user_id": 1, "start_time": "2024-06-01T10:00:00Z",
                "end_time": "2024-06-01T11:30:00+02:00"}"#,
        )
        .unwrap();
        assert_eq!(req.start_time, Some(datetime!(2024-06-01 10:00 UTC)));
        assert_eq!(req.end_time, Some(datetime!(2024-06-01 09:30 UTC)));
        assert!(req.note.is_none());
    }

    #[test]
    fn patch_distinguishes_absent_from_empty() {
        let patch: BookingPatch = serde_json::from_str(r#"{"note": ""}"#).unwrap();
        assert_eq!(patch.field("note"), Some(Value::Text("")));
        assert!(patch.field("start_time").is_none());
        assert!(patch.field("end_time").is_none());
    }

    #[test]
    fn sub_microsecond_digits_are_dropped() {
        let patch: BookingPatch = serde_json::from_str(
            r#"{"start_time": "2024-06-01T10:00:00.123456789Z", "end_time": null}"#,
        )
        .unwrap();
        assert_eq!(
            patch.start_time,
            Some(datetime!(2024-06-01 10:00:00.123456 UTC))
        );
        assert!(patch.end_time.is_none());
    }

    #[test]
    fn rejects_non_rfc3339_time() {
        let res: Result<BookingPatch, _> =
            serde_json::from_str(r#"{"start_time": "2024-06-01 10:00:00"}"#);
        assert!(res.is_err());
    }
}
