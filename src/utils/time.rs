//! Timestamp helpers.
//!
//! All timestamps are stored as RFC 3339 UTC strings with millisecond
//! precision ("2026-08-27T10:15:00.123Z"). The fixed format keeps string
//! ordering consistent with chronological ordering, so date-range filters
//! can compare TEXT columns directly.

use chrono::{DateTime, Datelike, NaiveDate, SecondsFormat, TimeZone, Utc};

pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn format_rfc3339(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_rfc3339(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Accepts either a full RFC 3339 timestamp or a bare `YYYY-MM-DD` date
/// (interpreted as midnight UTC), the two shapes dashboard clients send.
pub fn parse_date_param(s: &str) -> Option<DateTime<Utc>> {
    if let Some(dt) = parse_rfc3339(s) {
        return Some(dt);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| Utc.from_utc_datetime(&ndt))
}

/// Half-open [start, end) bounds for a calendar month, as stored strings.
pub fn month_bounds(year: i32, month: u32) -> Option<(String, String)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let to_utc = |d: NaiveDate| Utc.from_utc_datetime(&d.and_hms_opt(0, 0, 0).unwrap());
    Some((format_rfc3339(to_utc(start)), format_rfc3339(to_utc(end))))
}

/// Start of today, of the current month and of the current year, in UTC.
pub fn period_starts(now: DateTime<Utc>) -> (String, String, String) {
    let date = now.date_naive();
    let to_utc = |d: NaiveDate| Utc.from_utc_datetime(&d.and_hms_opt(0, 0, 0).unwrap());
    let today = to_utc(date);
    let month = to_utc(NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap());
    let year = to_utc(NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap());
    (
        format_rfc3339(today),
        format_rfc3339(month),
        format_rfc3339(year),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_bounds_december_rolls_over() {
        let (start, end) = month_bounds(2025, 12).unwrap();
        assert_eq!(start, "2025-12-01T00:00:00.000Z");
        assert_eq!(end, "2026-01-01T00:00:00.000Z");
    }

    #[test]
    fn stored_format_orders_lexicographically() {
        let a = "2026-08-27T10:15:00.000Z";
        let b = "2026-08-27T10:15:00.001Z";
        assert!(a < b);
        assert!(parse_rfc3339(a).unwrap() < parse_rfc3339(b).unwrap());
    }

    #[test]
    fn date_param_accepts_bare_dates() {
        let dt = parse_date_param("2026-01-15").unwrap();
        assert_eq!(format_rfc3339(dt), "2026-01-15T00:00:00.000Z");
        assert!(parse_date_param("not-a-date").is_none());
    }
}
