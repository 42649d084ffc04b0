//! Short-circuit rules evaluated before the sentiment backend
//!
//! Each rule is a pure function of the raw comment text that either returns
//! a verdict or passes. Rules run in order and the first verdict wins, so
//! cheap high-precision signals skip model inference entirely.

use crate::lexicon::{Lexicon, PhraseSet};
use commentscope_core::{Result, Sentiment};

/// Verdict produced by a rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleVerdict {
    pub sentiment: Sentiment,
    pub confidence: f64,
}

/// A single stage of the rule cascade
pub trait SentimentRule: Send + Sync {
    /// Rule name, used in logs
    fn name(&self) -> &'static str;

    /// Return a verdict to stop the cascade, or `None` to continue
    fn evaluate(&self, text: &str) -> Option<RuleVerdict>;
}

/// Empty or whitespace-only text is neutral with zero confidence
pub struct EmptyTextRule;

impl SentimentRule for EmptyTextRule {
    fn name(&self) -> &'static str {
        "empty-text"
    }

    fn evaluate(&self, text: &str) -> Option<RuleVerdict> {
        text.trim().is_empty().then_some(RuleVerdict {
            sentiment: Sentiment::Neutral,
            confidence: 0.0,
        })
    }
}

/// Short questions, price inquiries, and information requests are neutral
pub struct NeutralQuestionRule {
    question_keywords: PhraseSet,
    info_requests: PhraseSet,
    max_short_question_words: usize,
}

impl NeutralQuestionRule {
    pub const CONFIDENCE: f64 = 0.90;

    pub fn new(lexicon: &Lexicon) -> Result<Self> {
        Ok(Self {
            question_keywords: PhraseSet::new(&lexicon.question_keywords)?,
            info_requests: PhraseSet::new(&lexicon.info_requests)?,
            max_short_question_words: 5,
        })
    }

    fn is_neutral_question(&self, text: &str) -> bool {
        let lowered = text.trim().to_lowercase();

        if text.contains('?') {
            if lowered.split_whitespace().count() <= self.max_short_question_words {
                return true;
            }
            if self.question_keywords.contains_any(&lowered) {
                return true;
            }
        }

        self.info_requests.contains_any(&lowered)
    }
}

impl SentimentRule for NeutralQuestionRule {
    fn name(&self) -> &'static str {
        "neutral-question"
    }

    fn evaluate(&self, text: &str) -> Option<RuleVerdict> {
        self.is_neutral_question(text).then_some(RuleVerdict {
            sentiment: Sentiment::Neutral,
            confidence: Self::CONFIDENCE,
        })
    }
}

/// Positive emojis and blessing words mark a comment positive
pub struct PositiveIndicatorRule {
    emojis: PhraseSet,
    words: PhraseSet,
}

impl PositiveIndicatorRule {
    pub const CONFIDENCE: f64 = 0.85;

    pub fn new(lexicon: &Lexicon) -> Result<Self> {
        Ok(Self {
            emojis: PhraseSet::new(&lexicon.positive_emojis)?,
            words: PhraseSet::new(&lexicon.positive_words)?,
        })
    }
}

impl SentimentRule for PositiveIndicatorRule {
    fn name(&self) -> &'static str {
        "positive-indicator"
    }

    fn evaluate(&self, text: &str) -> Option<RuleVerdict> {
        let hit = self.emojis.contains_any(text) || self.words.contains_any(&text.to_lowercase());
        hit.then_some(RuleVerdict {
            sentiment: Sentiment::Positive,
            confidence: Self::CONFIDENCE,
        })
    }
}

/// The standard rule order: empty guard, neutral questions, positive indicators
pub fn default_rules(lexicon: &Lexicon) -> Result<Vec<Box<dyn SentimentRule>>> {
    Ok(vec![
        Box::new(EmptyTextRule),
        Box::new(NeutralQuestionRule::new(lexicon)?),
        Box::new(PositiveIndicatorRule::new(lexicon)?),
    ])
}

/// Evaluate rules in order; the first verdict wins
pub fn first_verdict(
    rules: &[Box<dyn SentimentRule>],
    text: &str,
) -> Option<(&'static str, RuleVerdict)> {
    rules
        .iter()
        .find_map(|rule| rule.evaluate(text).map(|verdict| (rule.name(), verdict)))
}
