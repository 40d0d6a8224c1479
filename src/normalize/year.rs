//! Model year, car age and era cohort.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::records::UNKNOWN;

/// Four-digit year tokens 1900..=2029 embedded in free text.
static YEAR_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(19\d{2}|20[0-2]\d)\b").expect("year token pattern"));

pub const PRE_1970: &str = "Pre-1970";
pub const ERA_1970_1999: &str = "1970–1999";
pub const ERA_2000_2014: &str = "2000–2014";
pub const ERA_2015_PLUS: &str = "2015+";

/// Resolves the model year.
///
/// An explicit year wins when it lies in `1900..=current_year + 2`; otherwise
/// the first year token in the listing text is used.
pub fn resolve_year(explicit: Option<&str>, texts: &[&str], current_year: i32) -> Option<i32> {
    let explicit = explicit
        .and_then(parse_year_field)
        .filter(|y| (1900..=current_year + 2).contains(y));
    if explicit.is_some() {
        return explicit;
    }

    texts
        .iter()
        .find_map(|t| YEAR_TOKEN.find(t))
        .and_then(|m| m.as_str().parse::<i32>().ok())
}

/// Year columns often arrive as `2015` or `2015.0`.
fn parse_year_field(text: &str) -> Option<i32> {
    let text = text.trim();
    let integral = text.split_once('.').map_or(text, |(head, _)| head);
    integral.parse::<i32>().ok()
}

/// Age in years; a missing year counts as a current-year car (age zero).
pub fn car_age(year: Option<i32>, current_year: i32) -> i32 {
    current_year - year.unwrap_or(current_year)
}

pub fn era_cohort(year: Option<i32>) -> &'static str {
    match year {
        None => UNKNOWN,
        Some(y) if y < 1970 => PRE_1970,
        Some(y) if y < 2000 => ERA_1970_1999,
        Some(y) if y < 2015 => ERA_2000_2014,
        Some(_) => ERA_2015_PLUS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_year_wins() {
        assert_eq!(resolve_year(Some("1988"), &["2015 BMW M3"], 2025), Some(1988));
        assert_eq!(resolve_year(Some("2015.0"), &[], 2025), Some(2015));
    }

    #[test]
    fn test_explicit_out_of_range_falls_back_to_text() {
        assert_eq!(resolve_year(Some("2031"), &["2015 BMW M3"], 2025), Some(2015));
        assert_eq!(resolve_year(Some("1850"), &["BMW M3"], 2025), None);
    }

    #[test]
    fn test_text_scan() {
        assert_eq!(resolve_year(None, &["Porsche 911 from 1973"], 2025), Some(1973));
        assert_eq!(resolve_year(None, &["BMW 2002tii"], 2025), None);
        assert_eq!(resolve_year(None, &["Model 2035 concept"], 2025), None);
        assert_eq!(resolve_year(None, &["M3", "1999 BMW M3"], 2025), Some(1999));
    }

    #[test]
    fn test_car_age() {
        assert_eq!(car_age(Some(2015), 2025), 10);
        assert_eq!(car_age(None, 2025), 0);
    }

    #[test]
    fn test_cohort_buckets() {
        assert_eq!(era_cohort(None), "Unknown");
        assert_eq!(era_cohort(Some(1969)), "Pre-1970");
        assert_eq!(era_cohort(Some(1970)), "1970–1999");
        assert_eq!(era_cohort(Some(1999)), "1970–1999");
        assert_eq!(era_cohort(Some(2000)), "2000–2014");
        assert_eq!(era_cohort(Some(2014)), "2000–2014");
        assert_eq!(era_cohort(Some(2015)), "2015+");
    }
}
