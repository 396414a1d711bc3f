//! Vocabulary-based tagging

use crate::config::Config;
use crate::record::TagSet;
use regex::{Regex, RegexBuilder};

/// Matches page text against the type and keyword vocabularies
#[derive(Debug, Clone)]
pub struct Classifier {
    /// Configured entry paired with its lower-cased form
    types: Vec<(String, String)>,
    /// Configured entry paired with its boundary-anchored pattern
    keywords: Vec<(String, Regex)>,
}

impl Classifier {
    pub fn new(config: &Config) -> Result<Self, regex::Error> {
        let types = config
            .type_vocabulary
            .iter()
            .map(|entry| (entry.clone(), entry.to_lowercase()))
            .collect();

        // Leading boundary only, so inflected forms still match
        let keywords = config
            .keyword_vocabulary
            .iter()
            .map(|entry| {
                RegexBuilder::new(&format!(r"\b{}", regex::escape(entry)))
                    .case_insensitive(true)
                    .build()
                    .map(|pattern| (entry.clone(), pattern))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { types, keywords })
    }

    /// Collects every type whose name occurs in the text
    pub fn extract_type_tags(&self, text: &str) -> TagSet {
        let lower = text.to_lowercase();
        self.types
            .iter()
            .filter(|(_, needle)| lower.contains(needle.as_str()))
            .map(|(entry, _)| entry.clone())
            .collect()
    }

    /// Adds every keyword found in the text to `accumulator`
    pub fn scan_keywords(&self, text: &str, accumulator: &mut TagSet) {
        for (entry, pattern) in &self.keywords {
            if pattern.is_match(text) {
                accumulator.insert(entry.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> Classifier {
        let config = Config {
            type_vocabulary: vec![
                "Grundschule".to_string(),
                "Gymnasium".to_string(),
                "Gesamtschule".to_string(),
            ],
            keyword_vocabulary: vec![
                "MINT".to_string(),
                "Sport".to_string(),
                "Ganztag".to_string(),
                "C++".to_string(),
            ],
            ..Config::default()
        };
        Classifier::new(&config).unwrap()
    }

    #[test]
    fn test_type_tags_collect_all_matches() {
        let tags = classifier()
            .extract_type_tags("Integrierte GESAMTSCHULE mit gymnasium-Zweig und Grundschule");
        assert_eq!(tags.joined(), "Gesamtschule, Grundschule, Gymnasium");
    }

    #[test]
    fn test_type_tags_are_substring_matches() {
        let tags = classifier().extract_type_tags("Oberstufengymnasium Kassel");
        assert!(tags.contains("Gymnasium"));
    }

    #[test]
    fn test_keywords_need_leading_boundary() {
        let mut tags = TagSet::new();
        classifier().scan_keywords("Wir sind Mitglied im Sportverein", &mut tags);
        assert!(tags.contains("Sport"));

        let mut tags = TagSet::new();
        classifier().scan_keywords("Wintersport und Pflichtmint", &mut tags);
        assert!(tags.is_empty());
    }

    #[test]
    fn test_keywords_accumulate_without_duplicates() {
        let classifier = classifier();
        let mut tags = TagSet::new();
        classifier.scan_keywords("MINT-Profil und Ganztagsschule", &mut tags);
        classifier.scan_keywords("mint und ganztag", &mut tags);
        assert_eq!(tags.joined(), "Ganztag, MINT");
    }

    #[test]
    fn test_keyword_metacharacters_are_literal() {
        let mut tags = TagSet::new();
        classifier().scan_keywords("Kurse in C++ und Java", &mut tags);
        assert!(tags.contains("C++"));

        let mut tags = TagSet::new();
        classifier().scan_keywords("Kurse in CCC", &mut tags);
        assert!(!tags.contains("C++"));
    }

    #[test]
    fn test_classification_is_deterministic() {
        let classifier = classifier();
        let text = "Gymnasium mit Sport, MINT und Ganztag";
        let first = classifier.extract_type_tags(text);
        let second = classifier.extract_type_tags(text);
        assert_eq!(first, second);

        let mut a = TagSet::new();
        let mut b = TagSet::new();
        classifier.scan_keywords(text, &mut a);
        classifier.scan_keywords(text, &mut b);
        assert_eq!(a.joined(), b.joined());
    }
}
