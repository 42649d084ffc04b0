//! Mock sentiment backends for testing
//!
//! Provides configurable implementations of the SentimentBackend trait for
//! exercising the cascade, batch orchestration, and error handling without
//! loading a model.

#![allow(dead_code)]

use async_trait::async_trait;
use commentscope_classifiers::{LabelScheme, Prediction, SentimentBackend};
use commentscope_core::Result;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// A scripted mock backend
///
/// Returns the label of the first rule whose needle occurs in the text,
/// else the default label.
pub struct MockBackend {
    name: String,
    label: String,
    score: f32,
    rules: Vec<(String, String, f32)>,
    scheme: LabelScheme,
    simulated_latency: Option<Duration>,
    call_count: AtomicU32,
}

impl MockBackend {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            label: "3 stars".to_string(),
            score: 0.9,
            rules: Vec::new(),
            scheme: LabelScheme::StarRating,
            simulated_latency: None,
            call_count: AtomicU32::new(0),
        }
    }

    /// Set the default label and score
    pub fn with_label(mut self, label: &str, score: f32) -> Self {
        self.label = label.to_string();
        self.score = score;
        self
    }

    /// Return `label` with `score` when the text contains `needle`
    pub fn when(mut self, needle: &str, label: &str, score: f32) -> Self {
        self.rules
            .push((needle.to_string(), label.to_string(), score));
        self
    }

    pub fn with_scheme(mut self, scheme: LabelScheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.simulated_latency = Some(latency);
        self
    }

    /// Get the number of times classify was called
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl SentimentBackend for MockBackend {
    async fn classify(&self, text: &str) -> Result<Prediction> {
        self.call_count.fetch_add(1, Ordering::Relaxed);

        if let Some(latency) = self.simulated_latency {
            tokio::time::sleep(latency).await;
        }

        let (label, score) = self
            .rules
            .iter()
            .find(|(needle, _, _)| text.contains(needle.as_str()))
            .map(|(_, label, score)| (label.clone(), *score))
            .unwrap_or_else(|| (self.label.clone(), self.score));

        Ok(Prediction {
            label,
            score,
            model: Some(self.name.clone()),
            latency_us: self
                .simulated_latency
                .map(|d| d.as_micros() as u64)
                .unwrap_or(100),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn label_scheme(&self) -> LabelScheme {
        self.scheme
    }
}

/// A backend that always fails - for testing error paths
pub struct FailingBackend {
    name: String,
    error_message: String,
    call_count: AtomicU32,
}

impl FailingBackend {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            error_message: "Simulated backend failure".to_string(),
            call_count: AtomicU32::new(0),
        }
    }

    pub fn with_error(mut self, message: &str) -> Self {
        self.error_message = message.to_string();
        self
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl SentimentBackend for FailingBackend {
    async fn classify(&self, _text: &str) -> Result<Prediction> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        Err(commentscope_core::Error::model(&self.error_message))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn label_scheme(&self) -> LabelScheme {
        LabelScheme::Binary
    }
}
