use std::sync::OnceLock;

use regex::Regex;

use super::markers::{Marker, BULLET};

/// Outcome of looking up one field in agent output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction<T> {
    Found(T),
    NotFound,
}

impl<T> Extraction<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Extraction::Found(_))
    }

    pub fn found(self) -> Option<T> {
        match self {
            Extraction::Found(value) => Some(value),
            Extraction::NotFound => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Extraction<U> {
        match self {
            Extraction::Found(value) => Extraction::Found(f(value)),
            Extraction::NotFound => Extraction::NotFound,
        }
    }

    pub fn or_else(self, f: impl FnOnce() -> Extraction<T>) -> Extraction<T> {
        match self {
            Extraction::Found(_) => self,
            Extraction::NotFound => f(),
        }
    }

    pub fn unwrap_or_else(self, f: impl FnOnce() -> T) -> T {
        match self {
            Extraction::Found(value) => value,
            Extraction::NotFound => f(),
        }
    }
}

impl Extraction<String> {
    /// A marker followed by nothing counts as not found
    pub fn non_empty(self) -> Self {
        match self {
            Extraction::Found(value) if value.is_empty() => Extraction::NotFound,
            other => other,
        }
    }
}

impl<T> Extraction<Vec<T>> {
    pub fn non_empty(self) -> Self {
        match self {
            Extraction::Found(items) if items.is_empty() => Extraction::NotFound,
            other => other,
        }
    }
}

/// Text after the last occurrence of `marker`, up to the next known marker
/// or the end of `text`, trimmed.
pub fn extract_section(text: &str, marker: Marker) -> Extraction<String> {
    let label = marker.label();
    match text.rfind(label) {
        Some(start) => Extraction::Found(section_from(text, start + label.len(), marker)),
        None => Extraction::NotFound,
    }
}

/// Same as [`extract_section`], but the marker may be written in any letter case
pub fn extract_section_ignore_case(text: &str, marker: Marker) -> Extraction<String> {
    let label = marker.label();
    // ASCII folding keeps byte offsets valid for `text`
    match text.to_ascii_uppercase().rfind(label) {
        Some(start) => Extraction::Found(section_from(text, start + label.len(), marker)),
        None => Extraction::NotFound,
    }
}

fn section_from(text: &str, value_start: usize, marker: Marker) -> String {
    let rest = &text[value_start..];
    let end = Marker::ALL
        .iter()
        .filter(|other| **other != marker)
        .filter_map(|other| rest.find(other.label()))
        .min()
        .unwrap_or(rest.len());

    rest[..end].trim().to_string()
}

/// Split on `•`, trimming items and dropping empty ones
pub fn split_bullets(section: &str) -> Vec<String> {
    section
        .split(BULLET)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn extract_bullets(text: &str, marker: Marker) -> Extraction<Vec<String>> {
    extract_section(text, marker).map(|section| split_bullets(&section))
}

fn numbered_prefix() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?m)^[ \t]*\[\d+\](?:[ \t]+|$)").expect("static regex"))
}

/// Items introduced by a `[n] ` at the start of a line; text before the first item is ignored
pub fn split_numbered(section: &str) -> Vec<String> {
    numbered_prefix()
        .split(section)
        .skip(1)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn extract_questions(text: &str) -> Extraction<Vec<String>> {
    extract_section(text, Marker::SuggestedQuestions).map(|section| split_numbered(&section))
}
