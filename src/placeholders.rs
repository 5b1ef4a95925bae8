//! `{{name}}` placeholder scanning and substitution.
//!
//! A token is two opening braces, optional whitespace, one or more ASCII
//! letters, digits or underscores, optional whitespace and two closing braces.
//! Anything else, including unbalanced braces, is plain text. There is no
//! escape syntax.
use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*([a-zA-Z0-9_]+)\s*\}\}").expect("valid placeholder regex")
});

/// Returns the placeholder names in `text`, without duplicates, in the order
/// they first appear.
pub fn extract_placeholders(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    PLACEHOLDER_RE
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Replaces every placeholder token with its value, or with the empty string
/// when `values` has no entry for the name.
///
/// All matches are located in the original text before anything is replaced.
pub fn replace_placeholders(text: &str, values: &HashMap<String, String>) -> String {
    PLACEHOLDER_RE
        .replace_all(text, |caps: &Captures| {
            values.get(&caps[1]).cloned().unwrap_or_default()
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn extract_keeps_first_occurrence_order() {
        assert_eq!(extract_placeholders("{{b}} {{a}} {{b}}"), vec!["b", "a"]);
    }

    #[test]
    fn extract_allows_inner_whitespace() {
        assert_eq!(
            extract_placeholders("Dear {{ first_name }},\n{{last_name}} {{  id2 }}"),
            vec!["first_name", "last_name", "id2"]
        );
    }

    #[test]
    fn extract_ignores_malformed_tokens() {
        assert!(extract_placeholders("no tokens here").is_empty());
        assert!(extract_placeholders("{{}} {{a-b}} {{ two words }} {single} {{open").is_empty());
    }

    #[test]
    fn replace_substitutes_every_occurrence() {
        assert_eq!(
            replace_placeholders("Hi {{name}}, {{name}}!", &values(&[("name", "Sam")])),
            "Hi Sam, Sam!"
        );
    }

    #[test]
    fn replace_uses_empty_string_for_missing_names() {
        assert_eq!(replace_placeholders("{{x}}", &HashMap::new()), "");
        assert_eq!(
            replace_placeholders("[{{a}}|{{b}}]", &values(&[("b", "2")])),
            "[|2]"
        );
    }

    #[test]
    fn replace_does_not_rescan_inserted_values() {
        let vals = values(&[("a", "{{b}}"), ("b", "nope")]);
        assert_eq!(replace_placeholders("{{a}} {{ b }}", &vals), "{{b}} nope");
    }

    #[test]
    fn replace_passes_through_non_tokens() {
        let text = "{{ not valid }} {x} {{y-z}} }}{{";
        assert_eq!(replace_placeholders(text, &values(&[("x", "1")])), text);
    }

    #[test]
    fn replace_handles_values_of_different_length() {
        let vals = values(&[("short", "a much longer replacement"), ("long_name", "")]);
        assert_eq!(
            replace_placeholders("1{{short}}2{{long_name}}3{{short}}", &vals),
            "1a much longer replacement23a much longer replacement"
        );
    }
}
