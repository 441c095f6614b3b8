//! Lenient field deserializers
//!
//! The backend stores whatever the forms sent, so numeric fields arrive as
//! numbers, numeric strings or `null`, and optional text arrives as `""`.

use chrono::{DateTime, NaiveDate, SecondsFormat};
use serde::{Deserialize, Deserializer, de::Error as _};
use serde_json::Value;

/// Parse a monetary or numeric form value. Accepts `,` as decimal separator.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Number, numeric string or null (0.0)
pub fn amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(0.0),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| D::Error::custom("amount out of range")),
        Value::String(s) if s.trim().is_empty() => Ok(0.0),
        Value::String(s) => {
            parse_number(&s).ok_or_else(|| D::Error::custom(format!("invalid amount: {s}")))
        }
        other => Err(D::Error::custom(format!("invalid amount: {other}"))),
    }
}

/// Integer count; fractional values are truncated, null is 0
pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    amount(deserializer).map(|v| v.trunc() as i64)
}

/// Line quantity; negative values become 0
pub fn quantity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    count(deserializer).map(|v| v.clamp(0, i64::from(u32::MAX)) as u32)
}

/// `null` means the field's default
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Record timestamp as text, from whatever shape the writer used.
///
/// Strings pass through. Epoch milliseconds (`Date.now()`) and
/// `{_seconds, _nanoseconds}` timestamp objects become RFC 3339 UTC.
/// Any other value is `None`, never an error.
pub fn timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(timestamp_text(&Value::deserialize(deserializer)?))
}

fn timestamp_text(value: &Value) -> Option<String> {
    let utc = match value {
        Value::String(s) => {
            let s = s.trim();
            return (!s.is_empty()).then(|| s.to_string());
        }
        Value::Number(n) => {
            let millis = n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64))?;
            DateTime::from_timestamp_millis(millis)?
        }
        Value::Object(fields) => {
            let seconds = ["_seconds", "seconds"]
                .iter()
                .find_map(|key| fields.get(*key)?.as_i64())?;
            let nanos = ["_nanoseconds", "nanoseconds"]
                .iter()
                .find_map(|key| fields.get(*key)?.as_u64())
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(0);
            DateTime::from_timestamp(seconds, nanos)?
        }
        _ => return None,
    };
    Some(utc.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Optional text where `""` and null both mean absent
pub fn optional_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()))
}

/// Calendar date without time component. Accepts `YYYY-MM-DD` or an ISO
/// timestamp (date part only); empty or unparseable values become `None`.
pub fn optional_date<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        let date_part = s.trim().get(..10)?.to_owned();
        NaiveDate::parse_from_str(&date_part, "%Y-%m-%d").ok()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Fields {
        #[serde(default, deserialize_with = "amount")]
        value: f64,
        #[serde(default, deserialize_with = "optional_text")]
        text: Option<String>,
        #[serde(default, deserialize_with = "optional_date")]
        date: Option<NaiveDate>,
        #[serde(default, deserialize_with = "timestamp")]
        at: Option<String>,
        #[serde(default, deserialize_with = "quantity")]
        qty: u32,
    }

    #[test]
    fn test_amount_accepts_strings_and_null() {
        let p: Fields = serde_json::from_str(r#"{"value": "12,50"}"#).unwrap();
        assert_eq!(p.value, 12.5);
        let p: Fields = serde_json::from_str(r#"{"value": null}"#).unwrap();
        assert_eq!(p.value, 0.0);
        let p: Fields = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(p.value, 0.0);
        assert!(serde_json::from_str::<Fields>(r#"{"value": "abc"}"#).is_err());
    }

    #[test]
    fn test_empty_text_and_dates_are_absent() {
        let p: Fields = serde_json::from_str(r#"{"text": "  ", "date": ""}"#).unwrap();
        assert!(p.text.is_none());
        assert!(p.date.is_none());

        let p: Fields =
            serde_json::from_str(r#"{"date": "1990-05-20T00:00:00.000Z"}"#).unwrap();
        assert_eq!(p.date, NaiveDate::from_ymd_opt(1990, 5, 20));
    }

    #[test]
    fn test_timestamp_accepts_every_writer_shape() {
        let p: Fields = serde_json::from_str(r#"{"at": "2026-10-16T10:00:00"}"#).unwrap();
        assert_eq!(p.at.as_deref(), Some("2026-10-16T10:00:00"));

        let p: Fields = serde_json::from_str(r#"{"at": 1760000000000}"#).unwrap();
        assert_eq!(p.at.as_deref(), Some("2025-10-09T08:53:20.000Z"));

        let p: Fields =
            serde_json::from_str(r#"{"at": {"_seconds": 1760000000, "_nanoseconds": 500000000}}"#)
                .unwrap();
        assert_eq!(p.at.as_deref(), Some("2025-10-09T08:53:20.500Z"));
    }

    #[test]
    fn test_unusable_timestamp_is_absent_not_an_error() {
        for raw in [r#"{"at": null}"#, r#"{"at": ""}"#, r#"{"at": true}"#, r#"{"at": [1]}"#, r#"{"at": {"x": 1}}"#] {
            let p: Fields = serde_json::from_str(raw).unwrap();
            assert!(p.at.is_none(), "{raw}");
        }
    }

    #[test]
    fn test_quantity_accepts_form_strings() {
        let p: Fields = serde_json::from_str(r#"{"qty": "2"}"#).unwrap();
        assert_eq!(p.qty, 2);
        let p: Fields = serde_json::from_str(r#"{"qty": null}"#).unwrap();
        assert_eq!(p.qty, 0);
        let p: Fields = serde_json::from_str(r#"{"qty": -3}"#).unwrap();
        assert_eq!(p.qty, 0);
    }
}
