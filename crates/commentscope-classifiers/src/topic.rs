//! Topic classification for negative comments
//!
//! Two stages: weighted keyword scoring against each category's keyword
//! table, then a fixed semantic fallback when no keyword matched at all.

use crate::lexicon::{Lexicon, PhraseSet};
use aho_corasick::AhoCorasick;
use commentscope_core::{Result, Topic};
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

/// Score for a multi-word phrase found in the text
const PHRASE_WEIGHT: u32 = 3;
/// Score for a single-word keyword equal to a whole token
const TOKEN_WEIGHT: u32 = 2;
/// Score for a single-word keyword found only inside a longer token
const SUBSTRING_WEIGHT: u32 = 1;

/// Maximum number of extracted keywords
pub const MAX_KEYWORDS: usize = 5;

/// How a topic was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentMethod {
    /// Text was empty
    Empty,
    /// Keyword scoring, with the winning score
    Keywords(u32),
    /// A semantic fallback pattern group matched
    Fallback,
    /// No pattern matched; decided by word count
    Length,
}

/// Result of topic classification
#[derive(Debug, Clone, PartialEq)]
pub struct TopicAssignment {
    pub topic: Topic,
    pub keywords: Vec<String>,
    pub method: AssignmentMethod,
}

struct CategoryMatcher {
    topic: Topic,
    matcher: AhoCorasick,
    keywords: Vec<String>,
}

impl CategoryMatcher {
    fn new(topic: Topic, keywords: &[String]) -> Result<Self> {
        let mut seen = HashSet::new();
        let keywords: Vec<String> = keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty() && seen.insert(k.clone()))
            .collect();

        let matcher = AhoCorasick::new(&keywords).map_err(|e| {
            commentscope_core::Error::classifier(format!(
                "Failed to build keyword matcher for {}: {}",
                topic, e
            ))
        })?;

        Ok(Self {
            topic,
            matcher,
            keywords,
        })
    }

    /// Each keyword present in `lowered` contributes its weight once
    fn score(&self, lowered: &str, tokens: &HashSet<&str>) -> u32 {
        let found: BTreeSet<usize> = self
            .matcher
            .find_overlapping_iter(lowered)
            .map(|m| m.pattern().as_usize())
            .collect();

        found
            .into_iter()
            .map(|idx| {
                let keyword = self.keywords[idx].as_str();
                if keyword.contains(char::is_whitespace) {
                    PHRASE_WEIGHT
                } else if tokens.contains(keyword) {
                    TOKEN_WEIGHT
                } else {
                    SUBSTRING_WEIGHT
                }
            })
            .sum()
    }
}

/// Ordered semantic fallback groups, checked before the length heuristic
struct FallbackGroup {
    topic: Topic,
    patterns: PhraseSet,
}

/// Assigns a complaint category and keywords to negative comments
pub struct TopicClassifier {
    categories: Vec<CategoryMatcher>,
    fallback: Vec<FallbackGroup>,
    stop_words: HashSet<String>,
}

impl TopicClassifier {
    /// Build matchers from a lexicon; categories are ordered by declaration
    pub fn new(lexicon: &Lexicon) -> Result<Self> {
        let mut entries: Vec<_> = lexicon.topics.iter().collect();
        entries.sort_by_key(|entry| entry.topic);

        let categories = entries
            .into_iter()
            .map(|entry| CategoryMatcher::new(entry.topic, &entry.keywords))
            .collect::<Result<Vec<_>>>()?;

        let patterns = &lexicon.fallback;
        let fallback = [
            (Topic::Delivery, &patterns.delivery),
            (Topic::Pricing, &patterns.price),
            (Topic::CustomerService, &patterns.service),
            (Topic::ProductIssues, &patterns.function),
            (Topic::BadQuality, &patterns.quality),
            (Topic::BadQuality, &lexicon.strong_negatives),
        ]
        .into_iter()
        .map(|(topic, list)| {
            Ok(FallbackGroup {
                topic,
                patterns: PhraseSet::new(list)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            categories,
            fallback,
            stop_words: lexicon.stop_words.iter().map(|w| w.to_lowercase()).collect(),
        })
    }

    /// Classify one negative comment's text
    pub fn classify(&self, text: &str) -> TopicAssignment {
        let lowered = text.trim().to_lowercase();
        if lowered.is_empty() {
            debug!("Empty text, defaulting to {}", Topic::BadQuality);
            return TopicAssignment {
                topic: Topic::BadQuality,
                keywords: Vec::new(),
                method: AssignmentMethod::Empty,
            };
        }

        let keywords = self.extract_keywords(&lowered);

        if let Some((topic, score)) = self.best_category(&lowered) {
            debug!(topic = %topic, score, "Topic assigned by keywords");
            return TopicAssignment {
                topic,
                keywords,
                method: AssignmentMethod::Keywords(score),
            };
        }

        let (topic, method) = self.fallback_topic(&lowered);
        debug!(topic = %topic, method = ?method, "Topic assigned by fallback");
        TopicAssignment {
            topic,
            keywords,
            method,
        }
    }

    /// Per-category keyword scores, in category order
    pub fn scores(&self, text: &str) -> Vec<(Topic, u32)> {
        let lowered = text.to_lowercase();
        let tokens: HashSet<&str> = tokenize(&lowered).collect();
        self.categories
            .iter()
            .map(|category| (category.topic, category.score(&lowered, &tokens)))
            .collect()
    }

    /// Strictly highest positive score; ties keep the earlier category
    fn best_category(&self, lowered: &str) -> Option<(Topic, u32)> {
        let mut best: Option<(Topic, u32)> = None;
        for (topic, score) in self.scores(lowered) {
            if score > best.map_or(0, |(_, s)| s) {
                best = Some((topic, score));
            }
        }
        best
    }

    fn fallback_topic(&self, lowered: &str) -> (Topic, AssignmentMethod) {
        if let Some(group) = self
            .fallback
            .iter()
            .find(|group| group.patterns.contains_any(lowered))
        {
            return (group.topic, AssignmentMethod::Fallback);
        }

        let topic = match lowered.split_whitespace().count() {
            0..=3 => Topic::BadQuality,
            4..=10 => Topic::ProductIssues,
            _ => Topic::CustomerService,
        };
        (topic, AssignmentMethod::Length)
    }

    /// First five alphabetic non-stop-word tokens longer than two characters
    pub fn extract_keywords(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        tokenize(&lowered)
            .filter(|token| token.chars().count() > 2)
            .filter(|token| token.chars().all(char::is_alphabetic))
            .filter(|token| !self.stop_words.contains(*token))
            .take(MAX_KEYWORDS)
            .map(str::to_string)
            .collect()
    }
}

/// Whitespace-separated words with surrounding punctuation trimmed
///
/// Inner hyphens and apostrophes stay, so "rip-off" and "don't" are one token.
fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|t| !t.is_empty())
}
