//! Quarter assignment from scraped date fields.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

use crate::quarter::Quarter;
use crate::records::{ProcessingContext, RawRecord};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y", "%B %d, %Y", "%b %d, %Y"];

/// chrono's `%Y` also takes one to three digits; a year below this came from
/// a two-digit year and belongs to the `%y` formats.
const MIN_FOUR_DIGIT_YEAR: i32 = 1000;

/// Parses the date-like strings the scrapers emit. Offsets are converted to UTC.
pub fn parse_date_like(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .find(|dt| dt.year() >= MIN_FOUR_DIGIT_YEAR)
    {
        return Some(dt);
    }
    DATE_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .find(|d| d.year() >= MIN_FOUR_DIGIT_YEAR)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Picks the quarter from the first date candidate that parses, is not in the
/// future, and lands in a valid quarter. Returns `None` rather than guessing.
pub fn assign_quarter(raw: &RawRecord, ctx: &ProcessingContext) -> Option<Quarter> {
    let now = ctx.now.naive_utc();
    raw.date_candidates()
        .into_iter()
        .flatten()
        .filter_map(parse_date_like)
        .filter(|dt| *dt <= now)
        .map(|dt| Quarter::from_date(dt.date()))
        .find(|q| q.is_valid_at(ctx.now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::DataSource;
    use chrono::{TimeZone, Utc};

    fn ctx() -> ProcessingContext {
        ProcessingContext::new(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap())
    }

    #[test]
    fn test_parse_formats() {
        for text in [
            "2025-03-14",
            "2025-03-14 10:22:01",
            "2025-03-14T10:22:01.123",
            "2025-03-14T10:22:01Z",
            "2025-03-14T10:22:01-05:00",
            "03/14/2025",
            "03/14/25",
            "March 14, 2025",
            "Mar 14, 2025",
        ] {
            let dt = parse_date_like(text).unwrap_or_else(|| panic!("{text}"));
            assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(), "{text}");
        }
        assert!(parse_date_like("NaT").is_none());
        assert!(parse_date_like("").is_none());
    }

    #[test]
    fn test_two_digit_year_gets_a_quarter() {
        let mut raw = RawRecord::new(DataSource::BringATrailer);
        raw.scraped_date = Some("03/14/25".into());
        assert_eq!(assign_quarter(&raw, &ctx()), Quarter::new(2025, 1));
    }

    #[test]
    fn test_future_date_falls_through_to_next_candidate() {
        let mut raw = RawRecord::new(DataSource::BringATrailer);
        raw.scraped_date = Some("2026-01-15".into());
        raw.sale_date = Some("2025-02-10".into());
        assert_eq!(assign_quarter(&raw, &ctx()), Quarter::new(2025, 1));
    }

    #[test]
    fn test_future_only_is_unassigned() {
        let mut raw = RawRecord::new(DataSource::BringATrailer);
        raw.scraped_date = Some("2026-01-15".into());
        assert_eq!(assign_quarter(&raw, &ctx()), None);
    }

    #[test]
    fn test_missing_dates_are_unassigned() {
        let raw = RawRecord::new(DataSource::BringATrailer);
        assert_eq!(assign_quarter(&raw, &ctx()), None);
    }

    #[test]
    fn test_pre_1990_skipped() {
        let mut raw = RawRecord::new(DataSource::BringATrailer);
        raw.scraped_date = Some("1985-05-05".into());
        raw.end_date = Some("2024-11-30".into());
        assert_eq!(assign_quarter(&raw, &ctx()), Quarter::new(2024, 4));
    }

    #[test]
    fn test_capture_date_has_priority() {
        let mut raw = RawRecord::new(DataSource::CarsAndBids);
        raw.scraped_date = Some("2025-05-31".into());
        raw.sale_date = Some("2024-01-02".into());
        assert_eq!(assign_quarter(&raw, &ctx()), Quarter::new(2025, 2));
    }
}
