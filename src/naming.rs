//! Naming helpers
//!
//! Identifier conversions shared by the facets and templates. Casing goes
//! through `convert_case`; pluralization and first-letter capitalisation are
//! small local rules.

use convert_case::{Case, Casing};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

/// `person_name` / `PersonName` -> `personName`
pub fn camelize(s: &str) -> String {
    s.to_case(Case::Camel)
}

/// `PersonName` -> `person_name`
pub fn underscore(s: &str) -> String {
    s.to_case(Case::Snake)
}

/// `PersonName` -> `person-name`
pub fn xmlize(s: &str) -> String {
    s.to_case(Case::Kebab)
}

/// Upper-case the first character, leaving the rest untouched.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// English plural of a type name.
pub fn pluralize(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }
    let lower = s.to_ascii_lowercase();
    if let Some(stem) = s.strip_suffix('y') {
        let before = stem.chars().last().map(|c| c.to_ascii_lowercase());
        if !matches!(before, Some('a' | 'e' | 'i' | 'o' | 'u') | None) {
            return format!("{}ies", stem);
        }
    }
    if ["s", "x", "z", "ch", "sh"].iter().any(|suffix| lower.ends_with(suffix)) {
        return format!("{}es", s);
    }
    format!("{}s", s)
}

/// Closest candidate to `name`, if any candidate matches at all.
pub fn closest_match<'a, S: AsRef<str>>(name: &str, candidates: &'a [S]) -> Option<&'a str> {
    if name.is_empty() {
        return None;
    }
    let matcher = SkimMatcherV2::default();
    candidates
        .iter()
        .map(|c| c.as_ref())
        .filter_map(|c| matcher.fuzzy_match(c, name).map(|score| (score, c)))
        .max_by_key(|(score, _)| *score)
        .map(|(_, c)| c)
}
