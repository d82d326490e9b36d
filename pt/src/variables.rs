//! Placeholder extraction and the ordered variable set
//!
//! Placeholders are written `{name}` where `name` is one or more word
//! characters. Doubled braces (`{{`, `}}`) are escapes for literal braces and
//! never start a placeholder. Anything else containing braces is plain text.
//!
//! A bare `\{(\w+)\}` scan would report `name` for `{{name}}`. This module
//! deliberately does not: `{{name}}` renders as the literal `{name}`, so
//! extraction agrees with what [`substitute`](crate::render::substitute)
//! actually fills.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Matches, in priority order, an escaped open brace, an escaped close brace,
/// or a placeholder (capture group 1 holds the name)
pub(crate) static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{|\}\}|\{(\w+)\}").expect("placeholder pattern is valid"));

/// Extract every placeholder name from `text`, left to right, duplicates included
pub fn extract_variables(text: &str) -> Vec<String> {
    let names: Vec<String> = PLACEHOLDER
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect();
    debug!(text_len = text.len(), count = names.len(), "extract_variables: called");
    names
}

/// Check whether `text` references the placeholder `name`
pub fn references(text: &str, name: &str) -> bool {
    PLACEHOLDER
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .any(|m| m.as_str() == name)
}

/// Ordered set of variable names
///
/// Keeps first-seen order and never holds duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableSet(Vec<String>);

impl VariableSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Variable set holding the de-duplicated placeholders of `text`
    pub fn from_text(text: &str) -> Self {
        extract_variables(text).into_iter().collect()
    }

    /// Append `name` unless already present. Returns true if it was added.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.0.push(name);
        true
    }

    /// Append every name not yet present, in iteration order
    pub fn extend<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.insert(name);
        }
    }

    /// Remove `name`. Returns true if it was present.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|n| n != name);
        self.0.len() != before
    }

    /// Keep only names matching the predicate, preserving order
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.0.retain(|n| keep(n));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl<S: Into<String>> FromIterator<S> for VariableSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = VariableSet::new();
        set.extend(iter);
        set
    }
}

impl From<Vec<String>> for VariableSet {
    fn from(names: Vec<String>) -> Self {
        names.into_iter().collect()
    }
}

impl From<&[&str]> for VariableSet {
    fn from(names: &[&str]) -> Self {
        names.iter().copied().collect()
    }
}

impl<const N: usize> From<[&str; N]> for VariableSet {
    fn from(names: [&str; N]) -> Self {
        names.into_iter().collect()
    }
}

impl<'a> IntoIterator for &'a VariableSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl PartialEq<[&str]> for VariableSet {
    fn eq(&self, other: &[&str]) -> bool {
        self.0.len() == other.len() && self.0.iter().zip(other).all(|(a, b)| a == b)
    }
}

impl<const N: usize> PartialEq<[&str; N]> for VariableSet {
    fn eq(&self, other: &[&str; N]) -> bool {
        self == &other[..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_extract_in_order_with_duplicates() {
        let vars = extract_variables("Hi {name}, meet {friend}. Bye {name}!");
        assert_eq!(vars, vec!["name", "friend", "name"]);
    }

    #[test]
    fn test_extract_word_characters_only() {
        assert_eq!(extract_variables("{a_1} {Zeta9} {дом}"), vec!["a_1", "Zeta9", "дом"]);
        assert!(extract_variables("{not valid} {with-dash} {} {").is_empty());
    }

    #[test]
    fn test_extract_skips_escaped_braces() {
        assert!(extract_variables("{{literal}}").is_empty());
        assert_eq!(extract_variables("{{{inner}}}"), vec!["inner"]);
        assert_eq!(extract_variables("json: {{\"k\": {value}}}"), vec!["value"]);
    }

    #[test]
    fn test_escaped_name_is_neither_extracted_nor_filled() {
        let text = "{{name}} and {other}";
        assert_eq!(extract_variables(text), vec!["other"]);
        let vars = crate::render::bindings([("name", "x"), ("other", "y")]);
        assert_eq!(crate::render::substitute(text, &vars).unwrap(), "{name} and y");
    }

    #[test]
    fn test_extract_unmatched_braces() {
        assert_eq!(extract_variables("open { then {ok} close }"), vec!["ok"]);
        assert!(extract_variables("}{").is_empty());
    }

    #[test]
    fn test_references() {
        assert!(references("say {word}", "word"));
        assert!(!references("say {{word}}", "word"));
        assert!(!references("say {words}", "word"));
    }

    #[test]
    fn test_variable_set_first_seen_order() {
        let mut set = VariableSet::from(["b", "a", "b"]);
        assert_eq!(set, ["b", "a"]);
        assert!(set.insert("c"));
        assert!(!set.insert("a"));
        assert_eq!(set, ["b", "a", "c"]);
    }

    #[test]
    fn test_variable_set_remove_and_retain() {
        let mut set = VariableSet::from(["x", "y", "z"]);
        assert!(set.remove("y"));
        assert!(!set.remove("y"));
        set.retain(|n| n != "x");
        assert_eq!(set, ["z"]);
    }

    #[test]
    fn test_variable_set_from_text() {
        let set = VariableSet::from_text("{q} then {a} then {q}");
        assert_eq!(set, ["q", "a"]);
    }

    #[test]
    fn test_variable_set_serializes_as_list() {
        let set = VariableSet::from(["one", "two"]);
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["one","two"]"#);
    }

    proptest! {
        #[test]
        fn prop_extract_finds_every_inserted_name(names in proptest::collection::vec("[a-z_][a-z0-9_]{0,8}", 0..6)) {
            let text: String = names.iter().map(|n| format!("<{{{}}}>", n)).collect();
            prop_assert_eq!(extract_variables(&text), names);
        }

        #[test]
        fn prop_variable_set_has_no_duplicates(names in proptest::collection::vec("[a-c]", 0..12)) {
            let set: VariableSet = names.iter().cloned().collect();
            let mut seen = std::collections::HashSet::new();
            for name in set.iter() {
                prop_assert!(seen.insert(name.to_string()));
            }
            for name in &names {
                prop_assert!(set.contains(name));
            }
        }
    }
}
