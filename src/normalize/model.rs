//! Model-text canonicalization.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::Rejection;

/// Makes stripped from the front of listing titles.
static KNOWN_MAKES: &[&str] = &[
    "Mercedes-Benz",
    "Mercedes",
    "BMW",
    "Porsche",
    "Audi",
    "Ferrari",
    "Lamborghini",
    "McLaren",
    "Chevrolet",
    "Chevy",
    "Ford",
    "Dodge",
    "Tesla",
    "Toyota",
    "Honda",
    "Nissan",
    "Lexus",
    "Acura",
    "Infiniti",
    "Jaguar",
    "Land Rover",
    "Range Rover",
    "Alfa Romeo",
    "Maserati",
    "Bentley",
    "Rolls-Royce",
    "Aston Martin",
    "Lotus",
    "Bugatti",
];

/// Make prefixes, longest first so `Mercedes-Benz` wins over `Mercedes`.
static MAKE_PREFIXES: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    let mut makes = KNOWN_MAKES.to_vec();
    makes.sort_by_key(|m| std::cmp::Reverse(m.len()));
    makes
        .into_iter()
        .map(|make| {
            let re = Regex::new(&format!(r"(?i)^{}[\s-]+", regex::escape(make)))
                .expect("make prefix pattern");
            (make, re)
        })
        .collect()
});

static LEADING_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}\s+").expect("year pattern"));
static PRODUCTION_RANGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\(\d{4}\s*[-–]\s*\d{4}\)\s*$").expect("range pattern"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern"));
static CODE_BEFORE_AMG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)([A-Z]+\d+[A-Z]*)\s*AMG").expect("amg pattern"));
static CODE_AFTER_AMG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)AMG\s+([A-Z0-9]+(?:\s+[A-Z0-9]+)?)").expect("amg pattern"));

/// Result of canonicalizing a listing title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelText {
    pub model: String,
    /// First known make stripped from the front of the title, if any.
    pub stripped_make: Option<&'static str>,
}

/// Reduces a listing title to a bare model name.
///
/// Strips a leading year, known make prefixes, and a trailing `(YYYY-YYYY)`
/// production range, then collapses whitespace. A bare `AMG` is resolved to a
/// chassis code found next to `AMG` in the original text (or, failing that, in
/// the listing title), or rejected.
pub fn canonical_model(text: &str, title: Option<&str>) -> Result<ModelText, Rejection> {
    let original = text.trim();
    if original.is_empty() {
        return Err(Rejection::MissingModel);
    }

    let mut model = LEADING_YEAR.replace(original, "").into_owned();

    let mut stripped_make = None;
    for (make, re) in MAKE_PREFIXES.iter() {
        if re.is_match(&model) {
            model = re.replace(&model, "").into_owned();
            stripped_make.get_or_insert(*make);
        }
    }

    let model = PRODUCTION_RANGE.replace(&model, "");
    let model = WHITESPACE.replace_all(&model, " ").trim().to_string();

    if model.eq_ignore_ascii_case("AMG") {
        return recover_amg_code(original)
            .or_else(|| title.and_then(recover_amg_code))
            .map(|model| ModelText {
                model,
                stripped_make,
            })
            .ok_or(Rejection::AmbiguousModel(model));
    }

    if model.is_empty() {
        return Err(Rejection::AmbiguousModel(original.to_string()));
    }

    Ok(ModelText {
        model,
        stripped_make,
    })
}

fn recover_amg_code(original: &str) -> Option<String> {
    if let Some(c) = CODE_BEFORE_AMG.captures(original) {
        return Some(format!("{} AMG", &c[1]));
    }
    CODE_AFTER_AMG
        .captures(original)
        .map(|c| format!("AMG {}", &c[1]))
}
