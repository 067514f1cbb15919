//! Timestamp parsing and serde adapters for ledger fields.
//!
//! Timestamps are written as RFC 3339 in UTC. Reading also accepts offset-less
//! ISO 8601 values (`2026-03-01T09:30:00.123456`), which older status files
//! contain; those are wall-clock local time.

use crate::error::{PackError, Result};
use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, Utc};

pub fn parse(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(|_| PackError::InvalidTimestamp(s.to_string()))?;
    Ok(from_local(naive))
}

/// Interpret a wall-clock reading in the local zone. A time skipped by a DST
/// jump has no local instant and is read as UTC.
fn from_local(naive: NaiveDateTime) -> DateTime<Utc> {
    match naive.and_local_timezone(Local).earliest() {
        Some(local) => local.with_timezone(&Utc),
        None => naive.and_utc(),
    }
}

pub fn format(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub mod required {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format(dt))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse(&raw).map_err(serde::de::Error::custom)
    }
}

pub mod optional {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
        match dt {
            Some(dt) => s.serialize_str(&super::format(dt)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(raw) => super::parse(&raw).map(Some).map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_rfc3339_with_offset() {
        let dt = parse("2026-03-01T10:30:00+01:00").unwrap();
        assert_eq!(dt.hour(), 9);
    }

    #[test]
    fn parses_naive_iso_as_local_time() {
        let dt = parse("2026-03-01T09:30:00.123456").unwrap();
        let local = dt.with_timezone(&Local);
        assert_eq!(local.day(), 1);
        assert_eq!(local.hour(), 9);
        assert_eq!(local.minute(), 30);
        assert_eq!(dt.nanosecond(), 123_456_000);
    }

    #[test]
    fn naive_local_now_reads_back_as_now() {
        let written = Local::now()
            .naive_local()
            .format("%Y-%m-%dT%H:%M:%S%.6f")
            .to_string();
        let drift = Utc::now() - parse(&written).unwrap();
        assert!(drift.num_seconds().abs() < 5, "drift was {drift}");
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse("yesterday").is_err());
    }

    #[test]
    fn format_keeps_full_precision() {
        let now = Utc::now();
        assert_eq!(parse(&format(&now)).unwrap(), now);
    }
}
