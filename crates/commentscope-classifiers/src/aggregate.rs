//! Batch statistics
//!
//! Pure folds over classified comments. Nothing here touches the
//! classifiers, so results can be recomputed from stored comments.

use commentscope_core::{
    round_to, AnalysisResult, ClassifiedComment, Sentiment, SentimentStats, Topic, TopicShare,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Comments grouped by sentiment, in input order
#[derive(Debug, Default, Serialize)]
pub struct SentimentPartition<'a> {
    pub positive: Vec<&'a ClassifiedComment>,
    pub negative: Vec<&'a ClassifiedComment>,
    pub neutral: Vec<&'a ClassifiedComment>,
}

impl<'a> SentimentPartition<'a> {
    pub fn get(&self, sentiment: Sentiment) -> &[&'a ClassifiedComment] {
        match sentiment {
            Sentiment::Positive => &self.positive,
            Sentiment::Negative => &self.negative,
            Sentiment::Neutral => &self.neutral,
        }
    }
}

/// Split comments by sentiment without reordering or copying them
pub fn partition(classified: &[ClassifiedComment]) -> SentimentPartition<'_> {
    classified
        .iter()
        .fold(SentimentPartition::default(), |mut parts, comment| {
            match comment.sentiment {
                Sentiment::Positive => parts.positive.push(comment),
                Sentiment::Negative => parts.negative.push(comment),
                Sentiment::Neutral => parts.neutral.push(comment),
            }
            parts
        })
}

/// Percentage rounded to two decimals; 0 when `total` is 0
pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        round_to(count as f64 / total as f64 * 100.0, 2)
    }
}

/// Sentiment counts and percentages plus topic counts over negatives
pub fn summarize(classified: &[ClassifiedComment]) -> AnalysisResult {
    let mut stats = SentimentStats::default();
    let mut topic_stats: BTreeMap<Topic, usize> = BTreeMap::new();

    for comment in classified {
        match comment.sentiment {
            Sentiment::Positive => stats.positive += 1,
            Sentiment::Negative => {
                stats.negative += 1;
                if let Some(topic) = comment.topic {
                    *topic_stats.entry(topic).or_default() += 1;
                }
            }
            Sentiment::Neutral => stats.neutral += 1,
        }
    }

    let total = classified.len();
    stats.positive_percentage = percentage(stats.positive, total);
    stats.negative_percentage = percentage(stats.negative, total);
    stats.neutral_percentage = percentage(stats.neutral, total);

    AnalysisResult {
        total_comments: total,
        sentiment_stats: stats,
        topic_stats,
    }
}

/// Topic counts with their share of negative comments
pub fn topic_summary(result: &AnalysisResult) -> BTreeMap<Topic, TopicShare> {
    let negatives = result.sentiment_stats.negative;
    result
        .topic_stats
        .iter()
        .map(|(topic, &count)| {
            (
                *topic,
                TopicShare {
                    count,
                    percentage: percentage(count, negatives),
                },
            )
        })
        .collect()
}
