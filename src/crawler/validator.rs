//! Strict-mode check that a page is an institution's own self-description

use crate::crawler::truncate_chars;
use regex::{Regex, RegexBuilder};

/// Characters of page text inspected
pub const VALIDATION_WINDOW: usize = 10_000;

/// Words that mark mission-statement or concept pages
const TRIGGER_PHRASES: [&str; 5] = [
    "leitbild",
    "konzept",
    "schulprogramm",
    "schulprofil",
    "pädagogik",
];

/// Self-referential sentences, tried in order
const SELF_DESCRIPTION_PATTERNS: [&str; 5] = [
    r"wir\s+sind\s+eine?\s",
    r"unsere\s+schule",
    r"wir\s+(?:als\s+)?schule",
    r"die\s+schule",
    r"die\s+.{0,100}?\s+ist\s+eine?\s",
];

/// Heuristic gate rejecting portals and generic landing pages
#[derive(Debug, Clone)]
pub struct ContentValidator {
    patterns: Vec<Regex>,
}

impl ContentValidator {
    pub fn new() -> Result<Self, regex::Error> {
        let patterns = SELF_DESCRIPTION_PATTERNS
            .iter()
            .map(|pattern| RegexBuilder::new(pattern).case_insensitive(true).build())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Returns true if the text reads like an official about-us page
    pub fn is_official_page(&self, text: &str) -> bool {
        let window = truncate_chars(text, VALIDATION_WINDOW);
        let lower = window.to_lowercase();

        if TRIGGER_PHRASES.iter().any(|phrase| lower.contains(phrase)) {
            return true;
        }

        self.patterns.iter().any(|pattern| pattern.is_match(window))
    }
}
