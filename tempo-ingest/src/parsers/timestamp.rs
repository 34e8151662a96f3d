//! Lenient timestamp parser.
//!
//! Accepted shapes:
//!   "2026-03-02T09:00:00.000Z"      RFC 3339 (any offset)
//!   "2026-03-02 09:00" / "...:05"   naive, read as UTC
//!   "2026-03-02"                    midnight UTC
//!   1772442000000 / "1772442000"    epoch millis or seconds
//!   {"$date": ...}                  Mongo extended JSON wrapping any of the above

use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use serde_json::Value;

/// Epoch values above this are taken as milliseconds.
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Timestamp {
    Absent,
    Parsed(DateTime<Utc>),
    Malformed(String),
}

impl Timestamp {
    pub fn ok(self) -> Option<DateTime<Utc>> {
        match self {
            Timestamp::Parsed(dt) => Some(dt),
            _ => None,
        }
    }
}

pub struct TimestampParser {
    epoch_re: Regex,
    naive_re: Regex,
    date_re: Regex,
}

impl TimestampParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            epoch_re: Regex::new(r"^-?\d{9,13}$")?,
            naive_re: Regex::new(r"^(?P<date>\d{4}-\d{2}-\d{2})[ T](?P<time>\d{2}:\d{2}(?::\d{2})?)(?:\.\d+)?$")?,
            date_re: Regex::new(r"^\d{4}-\d{2}-\d{2}$")?,
        })
    }

    pub fn parse(&self, value: &Value) -> Timestamp {
        match value {
            Value::Null => Timestamp::Absent,
            Value::String(s) if s.trim().is_empty() => Timestamp::Absent,
            Value::String(s) => self
                .parse_str(s.trim())
                .map(Timestamp::Parsed)
                .unwrap_or_else(|| Timestamp::Malformed(s.clone())),
            Value::Number(n) => n
                .as_i64()
                .and_then(from_epoch)
                .map(Timestamp::Parsed)
                .unwrap_or_else(|| Timestamp::Malformed(n.to_string())),
            Value::Object(map) => match map.get("$date").or_else(|| map.get("$numberLong")) {
                Some(inner) => self.parse(inner),
                None => Timestamp::Malformed(value.to_string()),
            },
            other => Timestamp::Malformed(other.to_string()),
        }
    }

    fn parse_str(&self, s: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        if self.epoch_re.is_match(s) {
            return s.parse::<i64>().ok().and_then(from_epoch);
        }
        if let Some(caps) = self.naive_re.captures(s) {
            let time = &caps["time"];
            let fmt = if time.len() == 5 { "%Y-%m-%d %H:%M" } else { "%Y-%m-%d %H:%M:%S" };
            let joined = format!("{} {}", &caps["date"], time);
            return NaiveDateTime::parse_from_str(&joined, fmt)
                .ok()
                .map(|ndt| Utc.from_utc_datetime(&ndt));
        }
        if self.date_re.is_match(s) {
            return NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|ndt| Utc.from_utc_datetime(&ndt));
        }
        None
    }
}

fn from_epoch(n: i64) -> Option<DateTime<Utc>> {
    if n.abs() >= MILLIS_THRESHOLD {
        DateTime::from_timestamp_millis(n)
    } else {
        DateTime::from_timestamp(n, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn expected() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    }

    #[test]
    fn parses_every_supported_shape() {
        let p = TimestampParser::new().unwrap();
        let millis = expected().timestamp_millis();
        let secs = expected().timestamp();
        for v in [
            json!("2026-03-02T09:00:00.000Z"),
            json!("2026-03-02T10:00:00+01:00"),
            json!("2026-03-02 09:00"),
            json!("2026-03-02T09:00:00"),
            json!(millis),
            json!(secs.to_string()),
            json!({ "$date": "2026-03-02T09:00:00Z" }),
            json!({ "$date": { "$numberLong": millis.to_string() } }),
        ] {
            assert_eq!(p.parse(&v), Timestamp::Parsed(expected()), "input {v}");
        }
        assert_eq!(
            p.parse(&json!("2026-03-02")).ok(),
            Some(Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn absent_and_malformed_are_distinguished() {
        let p = TimestampParser::new().unwrap();
        assert_eq!(p.parse(&Value::Null), Timestamp::Absent);
        assert_eq!(p.parse(&json!("")), Timestamp::Absent);
        assert_eq!(p.parse(&json!("next tuesday")), Timestamp::Malformed("next tuesday".into()));
        assert_eq!(p.parse(&json!("2026-13-45")), Timestamp::Malformed("2026-13-45".into()));
        assert!(matches!(p.parse(&json!(true)), Timestamp::Malformed(_)));
    }
}
