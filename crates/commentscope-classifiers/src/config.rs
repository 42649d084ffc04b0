//! Analyzer configuration

use crate::backend::LabelScheme;
use commentscope_core::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the analysis pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Sentiment models tried in order; the first that loads is used, and
    /// the polarity lexicon when none does
    #[serde(default)]
    pub models: Vec<ModelSpec>,

    /// Character limit for model input
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,

    /// Model scores below this downgrade non-neutral verdicts to neutral
    #[serde(default = "default_confidence_floor")]
    pub confidence_floor: f64,

    /// Log progress every N comments (0 disables)
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,

    /// Concurrent comment classifications (0 = number of CPUs)
    #[serde(default)]
    pub workers: usize,

    /// YAML file overriding the built-in keyword tables
    #[serde(default)]
    pub lexicon_path: Option<PathBuf>,
}

/// Sentiment model specification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Display name; defaults to the repo or directory name
    #[serde(default)]
    pub name: String,

    /// Where to load the model from
    pub source: ModelSource,

    /// Encoder architecture; read from `model_type` in config.json when absent
    #[serde(default)]
    pub architecture: Option<Architecture>,

    /// Label vocabulary; inferred from the model's labels when absent
    #[serde(default)]
    pub labels: Option<LabelSchemeSpec>,

    #[serde(default)]
    pub device: DeviceSpec,

    /// Maximum token sequence length
    #[serde(default = "default_max_length")]
    pub max_length: usize,
}

/// Model source configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ModelSource {
    /// Load from local filesystem
    Local { path: PathBuf },

    /// Download from HuggingFace Hub
    HuggingFace {
        repo: String,
        #[serde(default = "default_revision")]
        revision: String,
    },
}

/// Encoder architecture
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    #[default]
    Bert,
    DistilBert,
}

impl Architecture {
    /// Map a HuggingFace `model_type` to a supported architecture
    pub fn from_model_type(model_type: &str) -> Option<Self> {
        match model_type.to_ascii_lowercase().as_str() {
            "bert" => Some(Self::Bert),
            "distilbert" => Some(Self::DistilBert),
            _ => None,
        }
    }
}

/// Label vocabulary of a configured model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LabelSchemeSpec {
    StarRating,
    Binary,
}

impl LabelSchemeSpec {
    pub fn to_label_scheme(self) -> LabelScheme {
        match self {
            Self::StarRating => LabelScheme::StarRating,
            Self::Binary => LabelScheme::Binary,
        }
    }
}

/// Inference device
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceSpec {
    #[default]
    Cpu,
    Cuda,
    Metal,
}

fn default_max_text_chars() -> usize {
    crate::sentiment::DEFAULT_MAX_TEXT_CHARS
}

fn default_confidence_floor() -> f64 {
    crate::sentiment::DEFAULT_CONFIDENCE_FLOOR
}

fn default_progress_interval() -> usize {
    50
}

fn default_max_length() -> usize {
    512
}

fn default_revision() -> String {
    "main".to_string()
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            models: Vec::new(),
            max_text_chars: default_max_text_chars(),
            confidence_floor: default_confidence_floor(),
            progress_interval: default_progress_interval(),
            workers: 0,
            lexicon_path: None,
        }
    }
}

impl AnalyzerConfig {
    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Load from file and validate
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&content).map_err(|e| {
            commentscope_core::Error::config(format!(
                "Failed to parse {}: {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_floor) {
            return Err(commentscope_core::Error::config(format!(
                "confidence_floor must be within [0, 1], got {}",
                self.confidence_floor
            )));
        }
        if self.max_text_chars == 0 {
            return Err(commentscope_core::Error::config(
                "max_text_chars must be greater than 0",
            ));
        }
        Ok(())
    }

    /// Effective worker count
    pub fn worker_count(&self) -> usize {
        if self.workers == 0 {
            num_cpus::get().max(1)
        } else {
            self.workers
        }
    }
}

impl ModelSpec {
    /// HuggingFace model on the main revision with default settings
    pub fn huggingface(repo: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            source: ModelSource::HuggingFace {
                repo: repo.into(),
                revision: default_revision(),
            },
            architecture: None,
            labels: None,
            device: DeviceSpec::default(),
            max_length: default_max_length(),
        }
    }

    pub fn with_architecture(mut self, architecture: Architecture) -> Self {
        self.architecture = Some(architecture);
        self
    }

    /// Configured name, else the last path or repo segment
    pub fn display_name(&self) -> String {
        if !self.name.is_empty() {
            return self.name.clone();
        }
        match &self.source {
            ModelSource::HuggingFace { repo, .. } => repo.clone(),
            ModelSource::Local { path } => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "local-model".to_string()),
        }
    }
}
