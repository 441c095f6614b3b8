//! Time helpers

use chrono::{
    DateTime, Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};

/// Naive formats accepted for order timestamps, interpreted in the business timezone
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Current UTC time in epoch milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Parse a record timestamp into the given timezone.
///
/// Accepts RFC 3339 (what `Date.toISOString()` produces), naive date-times
/// and plain `YYYY-MM-DD` dates. Naive values are local to `tz`; a plain
/// date means local midnight. Returns `None` for anything else.
pub fn parse_timestamp<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(tz));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return localize(naive, tz);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| localize(date.and_time(NaiveTime::MIN), tz))
}

/// DST gap: a local time that does not exist resolves to `None`.
fn localize<Tz: TimeZone>(naive: NaiveDateTime, tz: &Tz) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&naive).earliest()
}

/// Midnight of the most recent Sunday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDateTime {
    let back = u64::from(date.weekday().num_days_from_sunday());
    date.checked_sub_days(Days::new(back))
        .unwrap_or(date)
        .and_time(NaiveTime::MIN)
}
