//! Sentiment backend trait and label interpretation
//!
//! A backend is the strategy behind the last stage of the sentiment cascade.
//! It turns cleaned text into a raw `(label, score)` pair; the cascade then
//! interprets the label according to the backend's [`LabelScheme`].

use async_trait::async_trait;
use commentscope_core::{Result, Sentiment};

/// Trait for all sentiment backends
#[async_trait]
pub trait SentimentBackend: Send + Sync {
    /// Score the given (already normalized) text
    async fn classify(&self, text: &str) -> Result<Prediction>;

    /// Get the backend name
    fn name(&self) -> &str;

    /// How the labels produced by this backend map to sentiments
    fn label_scheme(&self) -> LabelScheme;
}

/// Raw backend output
#[derive(Debug, Clone)]
pub struct Prediction {
    /// Backend label, e.g. "4 stars", "NEGATIVE", or "positive"
    pub label: String,

    /// Score in [0, 1]
    pub score: f32,

    /// Model name or version
    pub model: Option<String>,

    /// Latency in microseconds
    pub latency_us: u64,
}

impl Prediction {
    /// Create a new prediction
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
            model: None,
            latency_us: 0,
        }
    }
}

/// Label vocabulary of a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelScheme {
    /// Five-level star ratings ("1 star" .. "5 stars")
    StarRating,
    /// Binary POSITIVE / NEGATIVE polarity
    Binary,
    /// Labels are already sentiments; the score is |polarity|
    Polarity,
}

/// Score below which an unmapped label is read as neutral
const UNMAPPED_POSITIVE_SCORE: f32 = 0.6;

impl LabelScheme {
    /// Map a backend label to a sentiment.
    ///
    /// Model schemes apply `confidence_floor`: a non-neutral verdict scored
    /// below the floor is downgraded to neutral. Polarity labels are taken
    /// as-is.
    pub fn interpret(&self, label: &str, score: f32, confidence_floor: f32) -> Sentiment {
        let sentiment = match self {
            Self::StarRating => Self::interpret_stars(label, score),
            Self::Binary => Self::interpret_binary(label, score),
            Self::Polarity => return label.parse().unwrap_or(Sentiment::Neutral),
        };

        if sentiment != Sentiment::Neutral && score < confidence_floor {
            Sentiment::Neutral
        } else {
            sentiment
        }
    }

    fn interpret_stars(label: &str, score: f32) -> Sentiment {
        let label = label.to_lowercase();
        if label.contains("1 star") || label.contains("2 stars") {
            Sentiment::Negative
        } else if label.contains("3 stars") {
            Sentiment::Neutral
        } else if label.contains("4 stars") || label.contains("5 stars") {
            Sentiment::Positive
        } else {
            Self::unmapped(score)
        }
    }

    fn interpret_binary(label: &str, score: f32) -> Sentiment {
        let label = label.to_uppercase();
        if label.contains("POSITIVE") {
            Sentiment::Positive
        } else if label.contains("NEGATIVE") {
            Sentiment::Negative
        } else {
            Self::unmapped(score)
        }
    }

    fn unmapped(score: f32) -> Sentiment {
        if score < UNMAPPED_POSITIVE_SCORE {
            Sentiment::Neutral
        } else {
            Sentiment::Positive
        }
    }

    /// Guess the scheme from a model's label set
    pub fn infer(labels: &[String]) -> Self {
        if labels.iter().any(|l| l.to_lowercase().contains("star")) {
            Self::StarRating
        } else {
            Self::Binary
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLOOR: f32 = 0.55;

    #[test]
    fn test_star_rating_mapping() {
        let scheme = LabelScheme::StarRating;
        assert_eq!(scheme.interpret("1 star", 0.9, FLOOR), Sentiment::Negative);
        assert_eq!(scheme.interpret("2 stars", 0.7, FLOOR), Sentiment::Negative);
        assert_eq!(scheme.interpret("3 stars", 0.9, FLOOR), Sentiment::Neutral);
        assert_eq!(scheme.interpret("4 stars", 0.6, FLOOR), Sentiment::Positive);
        assert_eq!(scheme.interpret("5 stars", 0.99, FLOOR), Sentiment::Positive);
    }

    #[test]
    fn test_binary_mapping() {
        let scheme = LabelScheme::Binary;
        assert_eq!(scheme.interpret("POSITIVE", 0.98, FLOOR), Sentiment::Positive);
        assert_eq!(scheme.interpret("negative", 0.98, FLOOR), Sentiment::Negative);
    }

    #[test]
    fn test_unmapped_label_uses_score() {
        assert_eq!(
            LabelScheme::Binary.interpret("LABEL_2", 0.59, FLOOR),
            Sentiment::Neutral
        );
        assert_eq!(
            LabelScheme::StarRating.interpret("LABEL_2", 0.6, FLOOR),
            Sentiment::Positive
        );
    }

    #[test]
    fn test_confidence_floor_downgrades_to_neutral() {
        assert_eq!(
            LabelScheme::Binary.interpret("NEGATIVE", 0.54, FLOOR),
            Sentiment::Neutral
        );
        assert_eq!(
            LabelScheme::StarRating.interpret("5 stars", 0.5499, FLOOR),
            Sentiment::Neutral
        );
        assert_eq!(
            LabelScheme::Binary.interpret("NEGATIVE", 0.55, FLOOR),
            Sentiment::Negative
        );
    }

    #[test]
    fn test_polarity_labels_skip_floor() {
        assert_eq!(
            LabelScheme::Polarity.interpret("negative", 0.2, FLOOR),
            Sentiment::Negative
        );
        assert_eq!(
            LabelScheme::Polarity.interpret("garbage", 0.9, FLOOR),
            Sentiment::Neutral
        );
    }

    #[test]
    fn test_infer_scheme() {
        let stars: Vec<String> = (1..=5).map(|n| format!("{} stars", n)).collect();
        assert_eq!(LabelScheme::infer(&stars), LabelScheme::StarRating);

        let binary = vec!["NEGATIVE".to_string(), "POSITIVE".to_string()];
        assert_eq!(LabelScheme::infer(&binary), LabelScheme::Binary);
    }
}
