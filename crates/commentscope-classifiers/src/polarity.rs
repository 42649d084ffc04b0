//! Lexicon polarity backend
//!
//! Used when no sentiment model is loaded, and per comment whenever the
//! model backend fails.

use crate::backend::{LabelScheme, Prediction, SentimentBackend};
use crate::lexicon::PolarityLexicon;
use commentscope_core::{round_to, Result, Sentiment};
use std::collections::{HashMap, HashSet};
use std::time::Instant;

/// Polarity beyond which text counts as positive or negative
const POLARITY_THRESHOLD: f64 = 0.1;

/// Multiplier applied to a word preceded by a negation
const NEGATION_FACTOR: f32 = -0.5;

/// How many tokens back a negation still applies
const NEGATION_WINDOW: usize = 2;

pub struct PolarityFallbackSentiment {
    name: String,
    words: HashMap<String, f32>,
    negations: HashSet<String>,
    intensifiers: HashMap<String, f32>,
}

impl PolarityFallbackSentiment {
    pub fn new(lexicon: &PolarityLexicon) -> Self {
        Self::with_name("polarity-lexicon", lexicon)
    }

    pub fn with_name(name: impl Into<String>, lexicon: &PolarityLexicon) -> Self {
        let lower = |s: &String| s.to_lowercase();
        Self {
            name: name.into(),
            words: lexicon
                .words
                .iter()
                .map(|(w, s)| (lower(w), s.clamp(-1.0, 1.0)))
                .collect(),
            negations: lexicon.negations.iter().map(lower).collect(),
            intensifiers: lexicon
                .intensifiers
                .iter()
                .map(|(w, m)| (lower(w), *m))
                .collect(),
        }
    }

    /// Polarity of `text` in [-1, 1]; 0 when no scored word occurs.
    ///
    /// Each scored word may be scaled by an intensifier directly before it
    /// and flipped by a negation within the preceding two tokens. The
    /// result is the mean over scored words.
    pub fn polarity(&self, text: &str) -> f64 {
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = lowered
            .split(|c: char| !(c.is_alphanumeric() || c == '\''))
            .filter(|t| !t.is_empty())
            .collect();

        let mut scored = Vec::new();
        for (idx, token) in tokens.iter().enumerate() {
            let Some(&base) = self.words.get(*token) else {
                continue;
            };

            let mut value = base;
            if idx > 0 {
                if let Some(multiplier) = self.intensifiers.get(tokens[idx - 1]) {
                    value *= multiplier;
                }
            }

            let window_start = idx.saturating_sub(NEGATION_WINDOW);
            if tokens[window_start..idx]
                .iter()
                .any(|t| self.negations.contains(*t))
            {
                value *= NEGATION_FACTOR;
            }

            scored.push(value.clamp(-1.0, 1.0) as f64);
        }

        if scored.is_empty() {
            return 0.0;
        }

        let mean = scored.iter().sum::<f64>() / scored.len() as f64;
        mean.clamp(-1.0, 1.0)
    }

    /// Sentiment and confidence straight from the polarity
    pub fn verdict(&self, text: &str) -> (Sentiment, f64) {
        let polarity = self.polarity(text);
        let sentiment = if polarity > POLARITY_THRESHOLD {
            Sentiment::Positive
        } else if polarity < -POLARITY_THRESHOLD {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        };

        (sentiment, round_to(polarity.abs(), 4))
    }
}

#[async_trait::async_trait]
impl SentimentBackend for PolarityFallbackSentiment {
    async fn classify(&self, text: &str) -> Result<Prediction> {
        let start = Instant::now();
        let (sentiment, confidence) = self.verdict(text);

        Ok(Prediction {
            label: sentiment.as_str().to_string(),
            score: confidence as f32,
            model: Some(self.name.clone()),
            latency_us: start.elapsed().as_micros() as u64,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn label_scheme(&self) -> LabelScheme {
        LabelScheme::Polarity
    }
}
