//! Entity classification: model family, generation and variant key.

pub const GEN_OTHER: &str = "GEN_OTHER";
pub const GEN_UNKNOWN: &str = "GEN_UNKNOWN";

/// Trim codes that collapse a model into a family, checked in order against
/// the upper-cased model.
static FAMILY_RULES: &[(&str, &str)] = &[
    ("SL63", "SL63"),
    ("C63", "C63"),
    ("E63", "E63"),
    ("AMG GT", "AMG GT"),
];

/// A model-year window for one family of one make.
struct GenerationWindow {
    make_prefix: &'static str,
    family: &'static str,
    first_year: i32,
    last_year: Option<i32>,
    tag: &'static str,
}

static GENERATIONS: &[GenerationWindow] = &[
    GenerationWindow { make_prefix: "Mercedes", family: "SL63", first_year: 2012, last_year: Some(2019), tag: "R231" },
    GenerationWindow { make_prefix: "Mercedes", family: "SL63", first_year: 2022, last_year: None, tag: "R232" },
    GenerationWindow { make_prefix: "Mercedes", family: "C63", first_year: 2008, last_year: Some(2014), tag: "W204" },
    GenerationWindow { make_prefix: "Mercedes", family: "C63", first_year: 2015, last_year: Some(2021), tag: "W205" },
    GenerationWindow { make_prefix: "Mercedes", family: "E63", first_year: 2010, last_year: Some(2016), tag: "W212" },
    GenerationWindow { make_prefix: "Mercedes", family: "E63", first_year: 2017, last_year: Some(2023), tag: "W213" },
];

impl GenerationWindow {
    fn matches(&self, make: &str, family: &str, year: i32) -> bool {
        make.starts_with(self.make_prefix)
            && family == self.family
            && year >= self.first_year
            && self.last_year.is_none_or(|last| year <= last)
    }
}

/// Maps a normalized model to its family. Models without a rule are their own family.
pub fn model_family(model: &str) -> String {
    let upper = model.to_uppercase();
    FAMILY_RULES
        .iter()
        .find(|(code, _)| upper.contains(code))
        .map(|(_, family)| family.to_string())
        .unwrap_or_else(|| model.to_string())
}

/// Generation tag for a (make, family, year) triple.
pub fn generation(make: &str, family: &str, year: Option<i32>) -> &'static str {
    let Some(year) = year else {
        return GEN_UNKNOWN;
    };
    GENERATIONS
        .iter()
        .find(|w| w.matches(make, family, year))
        .map_or(GEN_OTHER, |w| w.tag)
}

/// Stable grouping key: make, family and generation joined by single spaces.
pub fn variant_key(make: &str, family: &str, generation: &str) -> String {
    [make.trim(), family.trim(), generation.trim()]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Classification of one canonical record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub model_family: String,
    pub generation: &'static str,
    pub variant_key: String,
}

pub fn classify(make: &str, model: &str, year: Option<i32>) -> Classification {
    let model_family = model_family(model);
    let generation = generation(make, &model_family, year);
    let variant_key = variant_key(make, &model_family, generation);
    Classification {
        model_family,
        generation,
        variant_key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_rules() {
        assert_eq!(model_family("SL63 AMG"), "SL63");
        assert_eq!(model_family("c63 amg Black Series"), "C63");
        assert_eq!(model_family("AMG GT R"), "AMG GT");
        assert_eq!(model_family("M3 Competition"), "M3 Competition");
    }

    #[test]
    fn test_sl63_generations() {
        assert_eq!(generation("Mercedes-Benz", "SL63", Some(2012)), "R231");
        assert_eq!(generation("Mercedes-Benz", "SL63", Some(2019)), "R231");
        assert_eq!(generation("Mercedes-Benz", "SL63", Some(2020)), GEN_OTHER);
        assert_eq!(generation("Mercedes-Benz", "SL63", Some(2023)), "R232");
        assert_eq!(generation("BMW", "SL63", Some(2015)), GEN_OTHER);
        assert_eq!(generation("Mercedes-Benz", "SL63", None), GEN_UNKNOWN);
    }

    #[test]
    fn test_variant_key_is_deterministic() {
        let a = classify("Mercedes-Benz", "SL63 AMG", Some(2014));
        let b = classify("Mercedes-Benz", "sl63 amg roadster", Some(2016));
        assert_eq!(a.variant_key, "Mercedes-Benz SL63 R231");
        assert_eq!(a.variant_key, b.variant_key);
    }

    #[test]
    fn test_variant_key_trims_parts() {
        assert_eq!(variant_key(" BMW ", "M3", "GEN_OTHER "), "BMW M3 GEN_OTHER");
        assert_eq!(variant_key("", "M3", "GEN_UNKNOWN"), "M3 GEN_UNKNOWN");
    }

    #[test]
    fn test_unruled_model_keeps_text() {
        let c = classify("BMW", "M3 Competition", Some(2015));
        assert_eq!(c.model_family, "M3 Competition");
        assert_eq!(c.generation, GEN_OTHER);
        assert_eq!(c.variant_key, "BMW M3 Competition GEN_OTHER");
    }
}
