//! Record model
//!
//! A [`Record`] is one organization under analysis. Its website is either a
//! URL or a sentinel, its tag sets are kept sorted and unique, and its summary
//! is either a provider-tagged synthesis or a sentinel marker.

mod roster;

pub use roster::{merge_roster, merge_roster_content};

use crate::url::parse_http_url;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Summaries this short are treated as unprocessed
pub const MIN_SUMMARY_CHARS: usize = 10;

/// Reserved values standing in for an absence or failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentinel {
    /// No website could be resolved
    NotFound,
    /// The resolved website returned no content
    Unreachable,
    /// Not yet processed, or context too short to summarize
    NoData,
    /// Every configured provider failed
    AIError,
    /// The crawl produced nothing worth summarizing
    InsufficientContext,
}

impl Sentinel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "NotFound",
            Self::Unreachable => "Unreachable",
            Self::NoData => "NoData",
            Self::AIError => "AIError",
            Self::InsufficientContext => "InsufficientContext",
        }
    }
}

impl fmt::Display for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record's website: a URL or one of the two website sentinels
///
/// Never empty. Parsing an empty or unrecognizable value yields `NotFound`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Website {
    Url(String),
    #[default]
    NotFound,
    Unreachable,
}

impl Website {
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Url(url) => Some(url),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Url(_))
    }
}

impl fmt::Display for Website {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::NotFound => f.write_str(Sentinel::NotFound.as_str()),
            Self::Unreachable => f.write_str(Sentinel::Unreachable.as_str()),
        }
    }
}

impl FromStr for Website {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        if value.is_empty() || value == Sentinel::NotFound.as_str() {
            return Ok(Self::NotFound);
        }
        if value == Sentinel::Unreachable.as_str() {
            return Ok(Self::Unreachable);
        }
        if parse_http_url(value).is_some() {
            return Ok(Self::Url(value.to_string()));
        }
        // Roster files often carry bare hosts like "www.schule.de"
        let prefixed = format!("https://{}", value);
        if !value.contains(char::is_whitespace)
            && value.contains('.')
            && parse_http_url(&prefixed).is_some()
        {
            return Ok(Self::Url(prefixed));
        }
        Ok(Self::NotFound)
    }
}

/// Sorted, duplicate-free tag set serialized as "a, b, c"
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagSet(BTreeSet<String>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tag, returning true if it was not present yet
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        let tag = tag.trim();
        if tag.is_empty() {
            return false;
        }
        self.0.insert(tag.to_string())
    }

    pub fn extend(&mut self, other: &TagSet) {
        for tag in other.iter() {
            self.0.insert(tag.clone());
        }
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    /// Returns the joined form used in the record file
    pub fn joined(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.0.iter().map(String::as_str).collect();
        f.write_str(&joined.join(", "))
    }
}

impl FromStr for TagSet {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tags = TagSet::new();
        for part in s.split(',') {
            tags.insert(part);
        }
        Ok(tags)
    }
}

impl<S: Into<String>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut tags = TagSet::new();
        for tag in iter {
            tags.insert(tag);
        }
        tags
    }
}

/// One organization under analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Unique key within a batch
    pub name: String,
    pub locality: String,
    pub website: Website,
    pub type_tags: TagSet,
    pub keyword_tags: TagSet,
    pub summary: String,
}

impl Record {
    /// Creates an unprocessed record as merged in from a roster
    pub fn new(name: impl Into<String>, locality: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            locality: locality.into(),
            website: Website::NotFound,
            type_tags: TagSet::new(),
            keyword_tags: TagSet::new(),
            summary: Sentinel::NoData.to_string(),
        }
    }

    /// Returns true if the record still needs a crawl pass
    ///
    /// A record is pending when its summary is blank, very short, or equal to
    /// one of the configured error markers.
    pub fn needs_processing(&self, error_markers: &BTreeSet<String>) -> bool {
        let summary = self.summary.trim();
        summary.chars().count() <= MIN_SUMMARY_CHARS || error_markers.contains(summary)
    }
}
