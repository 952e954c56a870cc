// src/ingest/dates.rs
//! Lenient date parsing: anything unrecognized becomes `None`, never an error.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d-%b-%y",
    "%d-%b-%Y",
    "%m/%d/%Y",
    "%d %B %Y",
];

/// Parse to UTC wall time; offset-bearing inputs are shifted to UTC.
pub fn parse_lenient(raw: &str) -> Option<NaiveDateTime> {
    parse_with(raw, |dt| dt.naive_utc())
}

/// Parse keeping the wall time written in the source, offset dropped.
/// Calendar-day grouping uses this so late-evening local times stay on
/// their own day.
pub fn parse_lenient_local(raw: &str) -> Option<NaiveDateTime> {
    parse_with(raw, |dt| dt.naive_local())
}

fn parse_with(
    raw: &str,
    resolve: impl Fn(DateTime<FixedOffset>) -> NaiveDateTime,
) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(resolve(dt));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(resolve(dt));
    }
    for f in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, f) {
            return Some(dt);
        }
    }
    for f in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, f) {
            return Some(d.and_time(NaiveTime::MIN));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn common_shapes_parse() {
        let cases = [
            "2017-12-31",
            "December 31, 2017",
            "Dec 31, 2017",
            "31-Dec-17",
            "12/31/2017",
            "2017-12-31 08:15:00",
            "2017-12-31T08:15:00Z",
        ];
        for c in cases {
            let d = parse_lenient(c).unwrap_or_else(|| panic!("should parse: {c}"));
            assert_eq!((d.year(), d.month(), d.day()), (2017, 12, 31), "{c}");
        }
    }

    #[test]
    fn fractional_seconds_parse() {
        for c in ["2024-04-30T08:00:00.123", "2024-04-30 08:00:00.5"] {
            let d = parse_lenient(c).unwrap_or_else(|| panic!("should parse: {c}"));
            assert_eq!(d.to_string().get(..19), Some("2024-04-30 08:00:00"), "{c}");
        }
    }

    #[test]
    fn offset_dates_keep_local_day() {
        let raw = "2024-03-01T23:30:00-05:00";
        let local = parse_lenient_local(raw).unwrap();
        assert_eq!(local.date().to_string(), "2024-03-01");
        assert_eq!(local.time().to_string(), "23:30:00");
        let utc = parse_lenient(raw).unwrap();
        assert_eq!(utc.date().to_string(), "2024-03-02");
        // no offset: both agree
        assert_eq!(
            parse_lenient_local("2024-03-01 23:30:00"),
            parse_lenient("2024-03-01 23:30:00")
        );
    }

    #[test]
    fn garbage_is_none() {
        assert!(parse_lenient("").is_none());
        assert!(parse_lenient("   ").is_none());
        assert!(parse_lenient("https://example.com/story").is_none());
        assert!(parse_lenient("2017-13-45").is_none());
    }
}
