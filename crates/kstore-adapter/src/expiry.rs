//! Expiry resolution.

use chrono::{DateTime, Utc};
use kstore_types::{to_utc_string, Expires};

/// Resolve caller-supplied expiry input to the string persisted in an
/// item's options.
///
/// Dates are used as-is, numbers are minutes from `now`, and strings are
/// parsed as dates. Missing or unparseable input means the item never
/// expires.
pub fn compute_expires(expires: Option<&Expires>, now: DateTime<Utc>) -> Option<String> {
    resolve_expiry(expires, now).map(|at| to_utc_string(&at))
}

/// Like [`compute_expires`], but yields the instant.
pub(crate) fn resolve_expiry(expires: Option<&Expires>, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    expires.and_then(|e| e.resolve(now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn no_input_never_expires() {
        assert_eq!(compute_expires(None, now()), None);
    }

    #[test]
    fn minutes_from_now() {
        let expires = Expires::Minutes(90);
        assert_eq!(
            compute_expires(Some(&expires), now()).as_deref(),
            Some("Wed, 01 Jan 2020 13:30:00 GMT")
        );
    }

    #[test]
    fn dates_and_strings() {
        let at = Expires::At(Utc.with_ymd_and_hms(1986, 5, 14, 0, 0, 0).unwrap());
        assert_eq!(
            compute_expires(Some(&at), now()).as_deref(),
            Some("Wed, 14 May 1986 00:00:00 GMT")
        );

        let text = Expires::from("1986-05-14");
        assert_eq!(
            compute_expires(Some(&text), now()).as_deref(),
            Some("Wed, 14 May 1986 00:00:00 GMT")
        );
    }

    #[test]
    fn unparseable_string_never_expires() {
        let text = Expires::from("whenever");
        assert_eq!(compute_expires(Some(&text), now()), None);
    }
}
