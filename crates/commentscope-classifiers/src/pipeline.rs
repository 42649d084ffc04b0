//! Batch analysis pipeline
//!
//! Runs the sentiment cascade over a batch on a bounded set of concurrent
//! tasks, then assigns topics to the negative comments. A cancellation
//! token stops new comments from starting; whatever finished is returned.

use crate::aggregate;
use crate::backend::{LabelScheme, SentimentBackend};
use crate::lexicon::Lexicon;
use crate::polarity::PolarityFallbackSentiment;
use crate::sentiment::{SentimentClassifier, DEFAULT_CONFIDENCE_FLOOR, DEFAULT_MAX_TEXT_CHARS};
use crate::topic::TopicClassifier;
use commentscope_core::{AnalysisResult, ClassifiedComment, Comment, Result, Sentiment};
use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Default number of comments between progress log lines
pub const DEFAULT_PROGRESS_INTERVAL: usize = 50;

/// Classified comments of one batch
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// Classified comments in input order
    pub comments: Vec<ClassifiedComment>,

    /// True when cancellation stopped the batch early
    pub cancelled: bool,
}

/// Sentiment cascade, topic classifier, and batch orchestration
pub struct AnalysisPipeline {
    sentiment: Arc<SentimentClassifier>,
    topics: Arc<TopicClassifier>,
    workers: usize,
    progress_interval: usize,
}

impl AnalysisPipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Name of the sentiment backend
    pub fn backend_name(&self) -> &str {
        self.sentiment.backend().name()
    }

    /// True when a sentiment model (rather than the polarity lexicon) is active
    pub fn is_model_backed(&self) -> bool {
        self.sentiment.backend().label_scheme() != LabelScheme::Polarity
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Classify a whole batch
    pub async fn analyze_batch(&self, comments: Vec<Comment>) -> Vec<ClassifiedComment> {
        self.analyze_batch_with_cancellation(comments, CancellationToken::new())
            .await
            .comments
    }

    /// Classify a batch, stopping early once `cancel` fires
    pub async fn analyze_batch_with_cancellation(
        &self,
        comments: Vec<Comment>,
        cancel: CancellationToken,
    ) -> BatchOutcome {
        let total = comments.len();
        if total == 0 {
            return BatchOutcome::default();
        }

        info!(total, workers = self.workers, "Analyzing comment batch");
        let start = Instant::now();
        let processed = AtomicUsize::new(0);

        let mut indexed: Vec<(usize, ClassifiedComment)> = stream::iter(comments.into_iter().enumerate())
            .take_until(cancel.cancelled())
            .map(|(idx, comment)| {
                let processed = &processed;
                async move {
                    let classified = self.classify_sentiment(comment).await;
                    let done = processed.fetch_add(1, Ordering::Relaxed) + 1;
                    if self.progress_interval > 0 && done % self.progress_interval == 0 {
                        info!("Processed {}/{} comments", done, total);
                    }
                    (idx, classified)
                }
            })
            .buffer_unordered(self.workers)
            .collect()
            .await;

        indexed.sort_unstable_by_key(|(idx, _)| *idx);
        let cancelled = indexed.len() < total;
        if cancelled {
            info!(
                "Batch cancelled after {}/{} comments",
                indexed.len(),
                total
            );
        }

        let classified = self.assign_topics(indexed.into_iter().map(|(_, c)| c).collect());

        metrics::histogram!("commentscope_batch_latency_us")
            .record(start.elapsed().as_micros() as f64);
        info!(
            classified = classified.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Batch analysis complete"
        );

        BatchOutcome {
            comments: classified,
            cancelled,
        }
    }

    /// Aggregate statistics for classified comments
    pub fn summarize(&self, classified: &[ClassifiedComment]) -> AnalysisResult {
        let result = aggregate::summarize(classified);
        if !result.topic_stats.is_empty() {
            info!("Topic distribution: {:?}", result.topic_stats);
        }
        result
    }

    /// Sentiment for one comment; failures become neutral with zero confidence
    async fn classify_sentiment(&self, comment: Comment) -> ClassifiedComment {
        let classified = match self.sentiment.classify(&comment.text).await {
            Ok(verdict) => ClassifiedComment::new(
                comment,
                verdict.sentiment,
                verdict.confidence,
                verdict.cleaned_text,
            ),
            Err(e) => {
                error!(comment_id = %comment.id, error = %e, "Failed to classify comment");
                metrics::counter!("commentscope_comment_failures_total").increment(1);
                ClassifiedComment::failed(comment)
            }
        };

        metrics::counter!(
            "commentscope_comments_total",
            "sentiment" => classified.sentiment.as_str()
        )
        .increment(1);

        classified
    }

    /// Attach topics to negative comments, leaving the rest untouched
    fn assign_topics(&self, classified: Vec<ClassifiedComment>) -> Vec<ClassifiedComment> {
        let negatives = classified
            .iter()
            .filter(|c| c.sentiment == Sentiment::Negative)
            .count();
        if negatives == 0 {
            return classified;
        }

        info!("Classifying topics for {} negative comments", negatives);

        classified
            .into_iter()
            .map(|comment| {
                if comment.sentiment != Sentiment::Negative {
                    return comment;
                }
                let assignment = self.topics.classify(comment.analysis_text());
                metrics::counter!("commentscope_topics_total", "topic" => assignment.topic.as_str())
                    .increment(1);
                comment.with_topic(assignment.topic, assignment.keywords)
            })
            .collect()
    }
}

/// Builder for [`AnalysisPipeline`]
pub struct PipelineBuilder {
    lexicon: Lexicon,
    backend: Option<Arc<dyn SentimentBackend>>,
    fallback: Option<Arc<dyn SentimentBackend>>,
    workers: usize,
    progress_interval: usize,
    max_text_chars: usize,
    confidence_floor: f64,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            lexicon: Lexicon::default(),
            backend: None,
            fallback: None,
            workers: 0,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
            confidence_floor: DEFAULT_CONFIDENCE_FLOOR,
        }
    }

    pub fn lexicon(mut self, lexicon: Lexicon) -> Self {
        self.lexicon = lexicon;
        self
    }

    /// Sentiment backend; the polarity lexicon when unset
    pub fn backend(mut self, backend: Arc<dyn SentimentBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Backend used when the main backend fails; the polarity lexicon when unset
    pub fn fallback(mut self, fallback: Arc<dyn SentimentBackend>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Concurrent classifications; 0 means one per CPU
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn max_text_chars(mut self, max_text_chars: usize) -> Self {
        self.max_text_chars = max_text_chars;
        self
    }

    pub fn confidence_floor(mut self, confidence_floor: f64) -> Self {
        self.confidence_floor = confidence_floor;
        self
    }

    pub fn build(self) -> Result<AnalysisPipeline> {
        self.lexicon.validate()?;

        let backend = self.backend.unwrap_or_else(|| {
            Arc::new(PolarityFallbackSentiment::new(&self.lexicon.polarity))
        });

        let mut sentiment = SentimentClassifier::new(&self.lexicon, backend)?
            .with_max_text_chars(self.max_text_chars)
            .with_confidence_floor(self.confidence_floor);
        if let Some(fallback) = self.fallback {
            sentiment = sentiment.with_fallback(fallback);
        }

        let workers = if self.workers == 0 {
            num_cpus::get().max(1)
        } else {
            self.workers
        };

        Ok(AnalysisPipeline {
            sentiment: Arc::new(sentiment),
            topics: Arc::new(TopicClassifier::new(&self.lexicon)?),
            workers,
            progress_interval: self.progress_interval,
        })
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commentscope_core::Topic;

    fn pipeline() -> AnalysisPipeline {
        AnalysisPipeline::builder().workers(2).build().unwrap()
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let outcome = pipeline()
            .analyze_batch_with_cancellation(Vec::new(), CancellationToken::new())
            .await;
        assert!(outcome.comments.is_empty());
        assert!(!outcome.cancelled);
    }

    #[tokio::test]
    async fn test_polarity_pipeline_end_to_end() {
        let pipeline = pipeline();
        assert!(!pipeline.is_model_backed());
        assert_eq!(pipeline.backend_name(), "polarity-lexicon");

        let comments = vec![
            Comment::new("1", "😍 love it"),
            Comment::new("2", "terrible quality, broke in 2 days"),
            Comment::new("3", "price?"),
            Comment::new("4", "waiting 3 weeks for delivery, still nothing"),
        ];

        let classified = pipeline.analyze_batch(comments).await;
        let sentiments: Vec<Sentiment> = classified.iter().map(|c| c.sentiment).collect();
        assert_eq!(
            sentiments,
            vec![
                Sentiment::Positive,
                Sentiment::Negative,
                Sentiment::Neutral,
                Sentiment::Negative
            ]
        );

        assert_eq!(classified[1].topic, Some(Topic::BadQuality));
        assert_eq!(classified[3].topic, Some(Topic::Delivery));
        assert!(classified[0].topic.is_none() && classified[0].keywords.is_none());

        let result = pipeline.summarize(&classified);
        assert_eq!(result.sentiment_stats.positive_percentage, 25.0);
        assert_eq!(result.sentiment_stats.negative_percentage, 50.0);
    }

    #[tokio::test]
    async fn test_pre_cancelled_batch_is_partial() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = pipeline()
            .analyze_batch_with_cancellation(vec![Comment::new("1", "ok")], cancel)
            .await;
        assert!(outcome.cancelled);
        assert!(outcome.comments.is_empty());
    }

    #[test]
    fn test_builder_rejects_invalid_lexicon() {
        let mut lexicon = Lexicon::default();
        lexicon.topics.clear();
        assert!(AnalysisPipeline::builder().lexicon(lexicon).build().is_err());
    }
}
