//! Core types for CommentScope

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A raw comment as supplied by the comment source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Identifier, unique within a batch
    pub id: String,

    /// Free-form comment text
    #[serde(default)]
    pub text: String,

    /// Author handle
    #[serde(default = "default_username")]
    pub username: String,

    /// Opaque timestamp supplied by the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// Like count
    #[serde(default)]
    pub likes: u64,
}

impl Comment {
    /// Create a comment with the given id and text
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            username: default_username(),
            timestamp: None,
            likes: 0,
        }
    }

    /// Set the author
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Set the timestamp
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Set the like count
    pub fn with_likes(mut self, likes: u64) -> Self {
        self.likes = likes;
        self
    }
}

fn default_username() -> String {
    "unknown".to_string()
}

/// Coarse polarity label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// All sentiments in reporting order
    pub const ALL: [Sentiment; 3] = [Self::Positive, Self::Negative, Self::Neutral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(Self::Positive),
            "negative" => Ok(Self::Negative),
            "neutral" => Ok(Self::Neutral),
            other => Err(format!("unknown sentiment '{}'", other)),
        }
    }
}

/// Complaint category assigned to negative comments.
///
/// Variant order is the declaration order used to break scoring ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Topic {
    #[serde(rename = "Delivery", alias = "delivery")]
    Delivery,
    #[serde(rename = "Bad Quality", alias = "bad_quality")]
    BadQuality,
    #[serde(rename = "Customer Service", alias = "customer_service")]
    CustomerService,
    #[serde(rename = "Pricing", alias = "pricing")]
    Pricing,
    #[serde(rename = "Product Issues", alias = "product_issues")]
    ProductIssues,
    #[serde(rename = "False Advertising", alias = "false_advertising")]
    FalseAdvertising,
}

impl Topic {
    /// All topics in declaration order
    pub const ALL: [Topic; 6] = [
        Self::Delivery,
        Self::BadQuality,
        Self::CustomerService,
        Self::Pricing,
        Self::ProductIssues,
        Self::FalseAdvertising,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delivery => "Delivery",
            Self::BadQuality => "Bad Quality",
            Self::CustomerService => "Customer Service",
            Self::Pricing => "Pricing",
            Self::ProductIssues => "Product Issues",
            Self::FalseAdvertising => "False Advertising",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', " ");
        Self::ALL
            .into_iter()
            .find(|topic| topic.as_str().to_lowercase() == wanted)
            .ok_or_else(|| format!("unknown topic '{}'", s))
    }
}

/// A comment after the sentiment cascade and, for negatives, topic assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedComment {
    /// The original comment, unchanged
    #[serde(flatten)]
    pub comment: Comment,

    pub sentiment: Sentiment,

    /// Confidence in [0, 1], rounded to 4 decimals
    pub confidence: f64,

    /// Normalized text, present only when the model stage ran
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleaned_text: Option<String>,

    /// Complaint topic, present only for negative comments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<Topic>,

    /// Up to five display keywords, present only for negative comments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
}

impl ClassifiedComment {
    /// Wrap a comment with its sentiment verdict
    pub fn new(
        comment: Comment,
        sentiment: Sentiment,
        confidence: f64,
        cleaned_text: Option<String>,
    ) -> Self {
        Self {
            comment,
            sentiment,
            confidence: round_to(confidence.clamp(0.0, 1.0), 4),
            cleaned_text,
            topic: None,
            keywords: None,
        }
    }

    /// Result emitted when classification of a comment failed
    pub fn failed(comment: Comment) -> Self {
        Self::new(comment, Sentiment::Neutral, 0.0, None)
    }

    /// Attach the topic assignment, consuming the sentiment-only record
    pub fn with_topic(mut self, topic: Topic, keywords: Vec<String>) -> Self {
        self.topic = Some(topic);
        self.keywords = Some(keywords);
        self
    }

    pub fn id(&self) -> &str {
        &self.comment.id
    }

    /// Text used for topic analysis: the cleaned text when available
    pub fn analysis_text(&self) -> &str {
        self.cleaned_text.as_deref().unwrap_or(&self.comment.text)
    }
}

/// Sentiment counts and percentages for one batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentStats {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    pub positive_percentage: f64,
    pub negative_percentage: f64,
    pub neutral_percentage: f64,
}

impl SentimentStats {
    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }

    pub fn count(&self, sentiment: Sentiment) -> usize {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Negative => self.negative,
            Sentiment::Neutral => self.neutral,
        }
    }
}

/// Count and share of one topic among negative comments
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TopicShare {
    pub count: usize,
    pub percentage: f64,
}

/// Aggregate statistics for one analyzed batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub total_comments: usize,
    pub sentiment_stats: SentimentStats,

    /// Topic counts among negative comments; absent topics are omitted
    pub topic_stats: BTreeMap<Topic, usize>,
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_defaults() {
        let comment: Comment = serde_json::from_str(r#"{"id": "c1", "text": "hello"}"#).unwrap();
        assert_eq!(comment.username, "unknown");
        assert_eq!(comment.likes, 0);
        assert!(comment.timestamp.is_none());
    }

    #[test]
    fn test_topic_names_round_trip_through_yaml() {
        let topics: Vec<Topic> =
            serde_yaml::from_str("[Delivery, Bad Quality, customer_service]").unwrap();
        assert_eq!(
            topics,
            vec![Topic::Delivery, Topic::BadQuality, Topic::CustomerService]
        );
        assert_eq!("false advertising".parse::<Topic>(), Ok(Topic::FalseAdvertising));
        assert!("Other".parse::<Topic>().is_err());
    }

    #[test]
    fn test_classified_comment_serialization() {
        let classified = ClassifiedComment::new(
            Comment::new("c1", "broke after a day"),
            Sentiment::Negative,
            0.912345,
            Some("broke after a day".to_string()),
        )
        .with_topic(Topic::ProductIssues, vec!["broke".to_string(), "day".to_string()]);

        let json = serde_json::to_value(&classified).unwrap();
        assert_eq!(json["id"], "c1");
        assert_eq!(json["sentiment"], "negative");
        assert_eq!(json["confidence"], 0.9123);
        assert_eq!(json["topic"], "Product Issues");
        assert_eq!(json["keywords"][0], "broke");
    }

    #[test]
    fn test_topic_fields_omitted_for_non_negative() {
        let classified =
            ClassifiedComment::new(Comment::new("c2", "nice"), Sentiment::Positive, 0.85, None);
        let json = serde_json::to_value(&classified).unwrap();
        assert!(json.get("topic").is_none());
        assert!(json.get("keywords").is_none());
        assert!(json.get("cleaned_text").is_none());
    }

    #[test]
    fn test_topic_stats_serialize_with_display_names() {
        let mut result = AnalysisResult::default();
        result.topic_stats.insert(Topic::BadQuality, 2);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["topic_stats"]["Bad Quality"], 2);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(33.333333, 2), 33.33);
        assert_eq!(round_to(0.85, 4), 0.85);
    }
}
