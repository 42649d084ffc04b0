//! Sentiment cascade
//!
//! Rules run first on the raw text; the first verdict wins. Text that no
//! rule decides is normalized, truncated, and scored by the active backend.
//! If the backend fails, the polarity fallback scores the same text.

use crate::backend::SentimentBackend;
use crate::lexicon::Lexicon;
use crate::normalize::{truncate_chars, TextNormalizer};
use crate::polarity::PolarityFallbackSentiment;
use crate::rules::{default_rules, first_verdict, SentimentRule};
use commentscope_core::{round_to, ClassifiedComment, Comment, Result, Sentiment};
use std::sync::Arc;
use tracing::{debug, warn};

/// Default character limit for model input
pub const DEFAULT_MAX_TEXT_CHARS: usize = 512;

/// Default score below which a model's non-neutral verdict becomes neutral
pub const DEFAULT_CONFIDENCE_FLOOR: f64 = 0.55;

/// Which part of the cascade produced a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictStage {
    /// A short-circuit rule, by name
    Rule(&'static str),
    /// The configured backend
    Backend,
    /// The polarity fallback after a backend error
    Fallback,
}

/// Sentiment verdict for one piece of text
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentVerdict {
    pub sentiment: Sentiment,
    pub confidence: f64,
    /// Normalized text, set when a backend stage ran
    pub cleaned_text: Option<String>,
    pub stage: VerdictStage,
}

/// Rule cascade plus backend
pub struct SentimentClassifier {
    rules: Vec<Box<dyn SentimentRule>>,
    normalizer: TextNormalizer,
    backend: Arc<dyn SentimentBackend>,
    fallback: Arc<dyn SentimentBackend>,
    max_text_chars: usize,
    confidence_floor: f64,
}

impl SentimentClassifier {
    /// Cascade with the default rules, backed by `backend`
    pub fn new(lexicon: &Lexicon, backend: Arc<dyn SentimentBackend>) -> Result<Self> {
        Ok(Self {
            rules: default_rules(lexicon)?,
            normalizer: TextNormalizer::new()?,
            backend,
            fallback: Arc::new(PolarityFallbackSentiment::new(&lexicon.polarity)),
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
            confidence_floor: DEFAULT_CONFIDENCE_FLOOR,
        })
    }

    /// Cascade that uses the polarity lexicon as its only backend
    pub fn polarity_only(lexicon: &Lexicon) -> Result<Self> {
        let backend = Arc::new(PolarityFallbackSentiment::new(&lexicon.polarity));
        Self::new(lexicon, backend)
    }

    /// Replace the backend used after a backend error
    pub fn with_fallback(mut self, fallback: Arc<dyn SentimentBackend>) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_max_text_chars(mut self, max_text_chars: usize) -> Self {
        self.max_text_chars = max_text_chars;
        self
    }

    pub fn with_confidence_floor(mut self, confidence_floor: f64) -> Self {
        self.confidence_floor = confidence_floor;
        self
    }

    pub fn backend(&self) -> &Arc<dyn SentimentBackend> {
        &self.backend
    }

    /// Run the cascade on raw comment text
    pub async fn classify(&self, text: &str) -> Result<SentimentVerdict> {
        if let Some((rule, verdict)) = first_verdict(&self.rules, text) {
            debug!(rule, sentiment = %verdict.sentiment, "Rule verdict");
            return Ok(SentimentVerdict {
                sentiment: verdict.sentiment,
                confidence: round_to(verdict.confidence, 4),
                cleaned_text: None,
                stage: VerdictStage::Rule(rule),
            });
        }

        let cleaned = self.normalizer.normalize(text);
        let input = truncate_chars(&cleaned, self.max_text_chars);

        let (prediction, stage) = match self.backend.classify(input).await {
            Ok(prediction) => (prediction, VerdictStage::Backend),
            Err(e) => {
                warn!(
                    backend = self.backend.name(),
                    error = %e,
                    "Sentiment backend failed, using {}",
                    self.fallback.name()
                );
                metrics::counter!("commentscope_model_fallbacks_total").increment(1);
                (self.fallback.classify(input).await?, VerdictStage::Fallback)
            }
        };

        let scheme = match stage {
            VerdictStage::Fallback => self.fallback.label_scheme(),
            _ => self.backend.label_scheme(),
        };
        let sentiment = scheme.interpret(
            &prediction.label,
            prediction.score,
            self.confidence_floor as f32,
        );

        Ok(SentimentVerdict {
            sentiment,
            confidence: round_to(f64::from(prediction.score).clamp(0.0, 1.0), 4),
            cleaned_text: Some(cleaned),
            stage,
        })
    }

    /// Classify a comment, producing its sentiment-only record
    pub async fn classify_comment(&self, comment: Comment) -> Result<ClassifiedComment> {
        let verdict = self.classify(&comment.text).await?;
        Ok(ClassifiedComment::new(
            comment,
            verdict.sentiment,
            verdict.confidence,
            verdict.cleaned_text,
        ))
    }
}
