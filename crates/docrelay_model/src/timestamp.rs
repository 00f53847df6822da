//! ISO-8601 timestamp helpers.
//!
//! Source collections are not consistent about offsets: some emit full
//! RFC 3339 (`2024-01-01T00:00:00Z`), others a bare local-less form
//! (`2024-01-01T00:00:00`). Both are accepted and normalized to UTC.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

use crate::error::{ModelError, ModelResult};

/// The minimum representable timestamp, used to bootstrap a watermark when
/// the status store holds no handled records yet.
pub fn minimum_timestamp() -> DateTime<Utc> {
    DateTime::<Utc>::MIN_UTC
}

/// Parses an ISO-8601 timestamp, treating offset-less values as UTC.
pub fn parse_iso8601(field: &str, value: &str) -> ModelResult<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    Err(ModelError::InvalidTimestamp {
        field: field.into(),
        value: value.into(),
    })
}

/// Formats a timestamp for the wire (`starttime` query values and
/// status-record fields).
pub fn format_iso8601(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_rfc3339() {
        let ts = parse_iso8601("lastModified", "2024-01-01T00:00:00Z").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn parses_offset() {
        let ts = parse_iso8601("lastModified", "2024-01-01T02:00:00+02:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn parses_offsetless_as_utc() {
        let ts = parse_iso8601("ModifiedOn", "2024-01-01T00:00:00.500").unwrap();
        assert_eq!(format_iso8601(ts), "2024-01-01T00:00:00Z");
    }

    #[test]
    fn rejects_garbage() {
        let err = parse_iso8601("lastModified", "yesterday").unwrap_err();
        assert!(matches!(err, ModelError::InvalidTimestamp { .. }));
    }

    #[test]
    fn round_trip() {
        let ts = Utc.with_ymd_and_hms(2024, 6, 15, 12, 30, 45).unwrap();
        let wire = format_iso8601(ts);
        assert_eq!(parse_iso8601("t", &wire).unwrap(), ts);
    }

    #[test]
    fn minimum_is_below_everything() {
        let ts = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap();
        assert!(minimum_timestamp() < ts);
    }
}
