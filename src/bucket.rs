//! Hour-bucket assignment for raw record timestamps.

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};

/// Offset-less timestamp layouts accepted from the feeds, read as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// The canonical hour a record falls in.
///
/// `sort_key` (epoch ms of the truncated hour) is the ordering and grouping
/// key. `label` is display-only and not year-qualified: two instants a year
/// apart with the same month/day/hour render identically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourBucket {
    pub label: String,
    pub sort_key: i64,
}

/// Maps a timestamp string to its hour bucket, or `None` if unparseable
/// (the caller drops the record).
pub fn bucket_timestamp(raw: &str) -> Option<HourBucket> {
    let instant = parse_instant(raw.trim())?;
    let truncated = instant
        .with_minute(0)?
        .with_second(0)?
        .with_nanosecond(0)?;

    Some(HourBucket {
        label: truncated.format("%b-%d %H:00").to_string(),
        sort_key: truncated.timestamp_millis(),
    })
}

fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    None
}
