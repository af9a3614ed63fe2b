//! Timestamps and caller-facing expiration input.
//!
//! Persisted timestamps use the HTTP-date form
//! (`Wed, 14 May 1986 00:00:00 GMT`), which keeps whole seconds only.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};

const UTC_STRING_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Format a point in time as a UTC string.
pub fn to_utc_string(at: &DateTime<Utc>) -> String {
    at.format(UTC_STRING_FORMAT).to_string()
}

/// Parse a textual point in time.
///
/// Accepts UTC strings (RFC 2822 / HTTP-date), RFC 3339, naive
/// `YYYY-MM-DDTHH:MM:SS[.fff]` (read as UTC), and bare `YYYY-MM-DD` dates
/// (midnight UTC). Anything else yields `None`.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(at) = DateTime::parse_from_rfc2822(text) {
        return Some(at.with_timezone(&Utc));
    }
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Some(at.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// When an item should stop being visible.
#[derive(Clone, Debug, PartialEq)]
pub enum Expires {
    /// An absolute point in time.
    At(DateTime<Utc>),
    /// Minutes relative to the moment of the write. Negative values are
    /// already in the past.
    Minutes(i64),
    /// Any textual point in time understood by [`parse_timestamp`].
    Text(String),
}

impl Expires {
    /// Resolve to an absolute instant relative to `now`.
    ///
    /// Unparseable text and out-of-range offsets resolve to `None`, meaning
    /// "never expires".
    pub fn resolve(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::At(at) => Some(*at),
            Self::Minutes(minutes) => {
                TimeDelta::try_minutes(*minutes).and_then(|delta| now.checked_add_signed(delta))
            }
            Self::Text(text) => parse_timestamp(text),
        }
    }
}

impl From<DateTime<Utc>> for Expires {
    fn from(at: DateTime<Utc>) -> Self {
        Self::At(at)
    }
}

impl From<i64> for Expires {
    fn from(minutes: i64) -> Self {
        Self::Minutes(minutes)
    }
}

impl From<i32> for Expires {
    fn from(minutes: i32) -> Self {
        Self::Minutes(i64::from(minutes))
    }
}

impl From<&str> for Expires {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Expires {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn birthday() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(1986, 5, 14, 0, 0, 0).unwrap()
    }

    #[test]
    fn utc_string_format() {
        assert_eq!(to_utc_string(&birthday()), "Wed, 14 May 1986 00:00:00 GMT");
    }

    #[test]
    fn utc_string_parses_back() {
        let text = to_utc_string(&birthday());
        assert_eq!(parse_timestamp(&text), Some(birthday()));
    }

    #[test]
    fn parses_iso_forms() {
        assert_eq!(parse_timestamp("1986-05-14T00:00:00Z"), Some(birthday()));
        assert_eq!(parse_timestamp("1986-05-14T00:00:00.000"), Some(birthday()));
        assert_eq!(parse_timestamp("1986-05-14"), Some(birthday()));
    }

    #[test]
    fn garbage_does_not_parse() {
        assert_eq!(parse_timestamp("next tuesday"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn minutes_are_relative_to_now() {
        let now = birthday();
        let resolved = Expires::Minutes(90).resolve(now).unwrap();
        assert_eq!(resolved - now, TimeDelta::minutes(90));

        let past = Expires::Minutes(-1).resolve(now).unwrap();
        assert!(past < now);
    }

    #[test]
    fn huge_offset_never_expires() {
        assert_eq!(Expires::Minutes(i64::MAX).resolve(birthday()), None);
    }

    #[test]
    fn text_resolution() {
        assert_eq!(Expires::from("1986-05-14").resolve(Utc::now()), Some(birthday()));
        assert_eq!(Expires::from("soon").resolve(Utc::now()), None);
    }
}
