//! CommentScope Core
//!
//! Core types and error handling shared across CommentScope components.
//!
//! This crate provides:
//! - The raw `Comment` input record and the `ClassifiedComment` output record
//! - Sentiment and topic label enums
//! - Aggregate `AnalysisResult` statistics
//! - Error types and result handling

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{
    round_to, AnalysisResult, ClassifiedComment, Comment, Sentiment, SentimentStats, Topic,
    TopicShare,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{ClassifiedComment, Comment, Sentiment, Topic};
}
