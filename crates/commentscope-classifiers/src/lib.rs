//! CommentScope Classifiers
//!
//! Sentiment and topic classification for social-media comments.
//!
//! The sentiment cascade runs in priority order:
//! - Empty-text guard
//! - Neutral question and information-request rule
//! - Positive emoji and blessing-word rule
//! - Sentiment backend (transformer model or polarity lexicon)
//!
//! Negative comments are then assigned a complaint topic by weighted keyword
//! scoring with a semantic fallback. The batch pipeline ties both together
//! and aggregates the results.

pub mod aggregate;
pub mod backend;
pub mod config;
pub mod lexicon;
#[cfg(feature = "ml-models")]
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod polarity;
pub mod registry;
pub mod rules;
pub mod sentiment;
pub mod topic;

pub use aggregate::{partition, summarize, topic_summary, SentimentPartition};
pub use backend::{LabelScheme, Prediction, SentimentBackend};
pub use config::{AnalyzerConfig, Architecture, DeviceSpec, LabelSchemeSpec, ModelSource, ModelSpec};
pub use lexicon::{Lexicon, PhraseSet};
#[cfg(feature = "ml-models")]
pub use model::ModelBackedSentiment;
pub use normalize::TextNormalizer;
pub use pipeline::{AnalysisPipeline, BatchOutcome, PipelineBuilder};
pub use polarity::PolarityFallbackSentiment;
pub use registry::{
    build_pipeline_from_config, init_pipeline_from_file, load_backend, load_config, load_lexicon,
};
pub use rules::{RuleVerdict, SentimentRule};
pub use sentiment::{SentimentClassifier, SentimentVerdict, VerdictStage};
pub use topic::{AssignmentMethod, TopicAssignment, TopicClassifier};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::backend::{LabelScheme, Prediction, SentimentBackend};
    pub use crate::pipeline::{AnalysisPipeline, BatchOutcome};
    pub use crate::polarity::PolarityFallbackSentiment;
    pub use crate::sentiment::SentimentClassifier;
    pub use crate::topic::TopicClassifier;
    pub use commentscope_core::prelude::*;
}
