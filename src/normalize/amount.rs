//! Numeric field cleaning for scraped text.

use once_cell::sync::Lazy;
use regex::Regex;

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("digit pattern"));

pub const MIN_SALE_AMOUNT: u64 = 100;
pub const MAX_SALE_AMOUNT: u64 = 10_000_000;

/// Amounts above this are checked for the trailing-digits scrape artifact.
pub const SCRAPE_ARTIFACT_THRESHOLD: u64 = 500_000;
const SCRAPE_ARTIFACT_SUFFIXES: [u64; 4] = [9, 10, 11, 12];

/// Parses a sale amount such as `"$48,500"` or `"48500.00"`.
///
/// Returns `None` for text with no digits and for amounts outside
/// [`MIN_SALE_AMOUNT`, `MAX_SALE_AMOUNT`] after artifact correction.
pub fn clean_sale_amount(text: &str) -> Option<u64> {
    let cleaned = text.replace(['$', ','], "");
    let cleaned = cleaned.trim();

    let integral = match cleaned.split_once('.') {
        Some((head, tail)) if !tail.contains('.') => head,
        _ => cleaned,
    };

    let amount = DIGITS.find(integral)?.as_str().parse::<u64>().ok()?;
    let amount = correct_scrape_artifact(amount);

    (MIN_SALE_AMOUNT..=MAX_SALE_AMOUNT)
        .contains(&amount)
        .then_some(amount)
}

/// Undoes a known scraper fault where two extra digits land on large amounts,
/// e.g. `523012` for a `$5,230` sale. Only amounts above
/// [`SCRAPE_ARTIFACT_THRESHOLD`] whose last three digits are 009..=012 qualify.
// TODO: review the suffix set against real sale-amount distributions.
pub fn correct_scrape_artifact(amount: u64) -> u64 {
    if amount > SCRAPE_ARTIFACT_THRESHOLD && SCRAPE_ARTIFACT_SUFFIXES.contains(&(amount % 1000)) {
        amount / 100
    } else {
        amount
    }
}

/// Extracts a count (views, bids, comments) from text like `"1,204 views"`.
/// Missing or digit-free text counts as zero.
pub fn extract_count(text: Option<&str>) -> u64 {
    let Some(text) = text else {
        return 0;
    };
    let cleaned = text.replace(',', "");
    DIGITS
        .find(&cleaned)
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .unwrap_or(0)
}
