//! Response envelopes for analysis results

use commentscope_classifiers::{partition, topic_summary, SentimentPartition};
use commentscope_core::{
    AnalysisResult, ClassifiedComment, Comment, Sentiment, SentimentStats, Topic, TopicShare,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Success envelope: `{success: true, data}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Comments to analyze, optionally tagged with the post they came from
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyzeRequest {
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub post_url: Option<String>,
}

/// Accept either a bare comment array or `{comments, post_url?}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AnalyzeInput {
    Comments(Vec<Comment>),
    Request(AnalyzeRequest),
}

impl From<AnalyzeInput> for AnalyzeRequest {
    fn from(input: AnalyzeInput) -> Self {
        match input {
            AnalyzeInput::Comments(comments) => AnalyzeRequest {
                comments,
                post_url: None,
            },
            AnalyzeInput::Request(request) => request,
        }
    }
}

/// One post with its comments
#[derive(Debug, Clone, Deserialize)]
pub struct PostComments {
    pub post_url: String,
    #[serde(default)]
    pub post_date: Option<String>,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzePostsRequest {
    pub posts: Vec<PostComments>,
}

/// Full analysis of one batch
#[derive(Debug, Serialize)]
pub struct AnalysisReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_url: Option<String>,
    pub total_comments: usize,
    pub sentiment_stats: SentimentStats,
    pub topic_stats: BTreeMap<Topic, usize>,
    pub topic_summary: BTreeMap<Topic, TopicShare>,
    pub all_comments: SentimentPartition<'a>,
}

impl<'a> AnalysisReport<'a> {
    pub fn new(
        post_url: Option<String>,
        result: AnalysisResult,
        classified: &'a [ClassifiedComment],
    ) -> Self {
        let topic_summary = topic_summary(&result);

        Self {
            post_url,
            total_comments: result.total_comments,
            sentiment_stats: result.sentiment_stats,
            topic_stats: result.topic_stats,
            topic_summary,
            all_comments: partition(classified),
        }
    }
}

/// Per-post sentiment counts
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SentimentBreakdown {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl SentimentBreakdown {
    fn record(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Negative => self.negative += 1,
            Sentiment::Neutral => self.neutral += 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostAnalysis {
    pub post_url: String,
    pub post_date: Option<String>,
    pub total_comments: usize,
    pub sentiment_breakdown: SentimentBreakdown,
}

/// Analysis of several posts run as a single batch
#[derive(Debug, Serialize)]
pub struct PostsReport<'a> {
    pub total_posts: usize,
    #[serde(flatten)]
    pub overall: AnalysisReport<'a>,
    pub posts_analysis: Vec<PostAnalysis>,
}

impl<'a> PostsReport<'a> {
    /// Attribute classified comments back to their posts by comment id
    pub fn new(
        posts: &[PostComments],
        result: AnalysisResult,
        classified: &'a [ClassifiedComment],
    ) -> Self {
        let posts_analysis = posts
            .iter()
            .map(|post| {
                let ids: HashSet<&str> = post.comments.iter().map(|c| c.id.as_str()).collect();
                let mut breakdown = SentimentBreakdown::default();
                let mut total = 0;
                for comment in classified.iter().filter(|c| ids.contains(c.id())) {
                    breakdown.record(comment.sentiment);
                    total += 1;
                }
                PostAnalysis {
                    post_url: post.post_url.clone(),
                    post_date: post.post_date.clone(),
                    total_comments: total,
                    sentiment_breakdown: breakdown,
                }
            })
            .collect();

        Self {
            total_posts: posts.len(),
            overall: AnalysisReport::new(None, result, classified),
            posts_analysis,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSummary {
    pub total_comments: usize,
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

/// Counts only, without comment details
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    pub stats: StatsSummary,
    pub topics: BTreeMap<Topic, usize>,
}

impl From<AnalysisResult> for StatsReport {
    fn from(result: AnalysisResult) -> Self {
        Self {
            stats: StatsSummary {
                total_comments: result.total_comments,
                positive: result.sentiment_stats.positive,
                negative: result.sentiment_stats.negative,
                neutral: result.sentiment_stats.neutral,
            },
            topics: result.topic_stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commentscope_classifiers::summarize;

    fn classified(id: &str, sentiment: Sentiment) -> ClassifiedComment {
        let comment = ClassifiedComment::new(Comment::new(id, "text"), sentiment, 0.9, None);
        if sentiment == Sentiment::Negative {
            comment.with_topic(Topic::Delivery, vec!["late".to_string()])
        } else {
            comment
        }
    }

    #[test]
    fn test_input_accepts_bare_array() {
        let request: AnalyzeRequest = serde_json::from_str::<AnalyzeInput>(
            r#"[{"id": "1", "text": "hello"}]"#,
        )
        .unwrap()
        .into();
        assert_eq!(request.comments.len(), 1);
        assert!(request.post_url.is_none());

        let request: AnalyzeRequest = serde_json::from_str::<AnalyzeInput>(
            r#"{"comments": [], "post_url": "https://example.com/p/1"}"#,
        )
        .unwrap()
        .into();
        assert_eq!(request.post_url.as_deref(), Some("https://example.com/p/1"));
    }

    #[test]
    fn test_posts_breakdown_by_comment_id() {
        let posts = vec![
            PostComments {
                post_url: "p1".to_string(),
                post_date: Some("2024-05-01".to_string()),
                comments: vec![Comment::new("a", "x"), Comment::new("b", "y")],
            },
            PostComments {
                post_url: "p2".to_string(),
                post_date: None,
                comments: vec![Comment::new("c", "z")],
            },
        ];
        let classified = vec![
            classified("a", Sentiment::Positive),
            classified("b", Sentiment::Negative),
            classified("c", Sentiment::Neutral),
        ];

        let report = PostsReport::new(&posts, summarize(&classified), &classified);
        assert_eq!(report.total_posts, 2);
        assert_eq!(report.overall.total_comments, 3);
        assert_eq!(report.posts_analysis[0].total_comments, 2);
        assert_eq!(
            report.posts_analysis[0].sentiment_breakdown,
            SentimentBreakdown {
                positive: 1,
                negative: 1,
                neutral: 0
            }
        );
        assert_eq!(report.posts_analysis[1].sentiment_breakdown.neutral, 1);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["total_posts"], 2);
        assert_eq!(json["topic_stats"]["Delivery"], 1);
        assert_eq!(json["topic_summary"]["Delivery"]["percentage"], 100.0);
        assert!(json.get("post_url").is_none());
    }

    #[test]
    fn test_stats_report() {
        let classified = vec![
            classified("a", Sentiment::Negative),
            classified("b", Sentiment::Negative),
            classified("c", Sentiment::Positive),
        ];

        let report = StatsReport::from(summarize(&classified));
        assert_eq!(report.stats.total_comments, 3);
        assert_eq!(report.stats.negative, 2);
        assert_eq!(report.topics[&Topic::Delivery], 2);
    }
}
