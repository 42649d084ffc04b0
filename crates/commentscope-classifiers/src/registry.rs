//! Pipeline construction from configuration

use crate::backend::SentimentBackend;
use crate::config::{AnalyzerConfig, ModelSpec};
use crate::lexicon::Lexicon;
use crate::pipeline::AnalysisPipeline;
use crate::polarity::PolarityFallbackSentiment;
use commentscope_core::Result;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Load analyzer configuration from file
pub fn load_config(path: impl AsRef<Path>) -> Result<AnalyzerConfig> {
    AnalyzerConfig::from_file(path.as_ref())
}

/// Keyword tables named by the config, or the built-in ones
pub fn load_lexicon(config: &AnalyzerConfig) -> Result<Lexicon> {
    match &config.lexicon_path {
        Some(path) => {
            info!("Loading lexicon from {}", path.display());
            Lexicon::from_file(path)
        }
        None => Ok(Lexicon::default()),
    }
}

/// Load the first configured model that works, degrading to the polarity
/// lexicon when none does
pub async fn load_backend(models: &[ModelSpec], lexicon: &Lexicon) -> Arc<dyn SentimentBackend> {
    if models.is_empty() {
        info!("No sentiment model configured, using polarity lexicon");
    } else if let Some(backend) = first_loadable(models, load_model).await {
        return backend;
    } else {
        warn!(
            "None of {} configured sentiment models loaded; using polarity lexicon",
            models.len()
        );
    }

    Arc::new(PolarityFallbackSentiment::new(&lexicon.polarity))
}

/// Try each spec in order and keep the first backend that loads
async fn first_loadable<F, Fut>(models: &[ModelSpec], mut load: F) -> Option<Arc<dyn SentimentBackend>>
where
    F: FnMut(ModelSpec) -> Fut,
    Fut: Future<Output = Result<Arc<dyn SentimentBackend>>>,
{
    for spec in models {
        match load(spec.clone()).await {
            Ok(backend) => {
                info!("✓ Loaded sentiment model: {}", backend.name());
                return Some(backend);
            }
            Err(e) => {
                warn!(
                    "✗ Failed to load sentiment model {}: {}",
                    spec.display_name(),
                    e
                );
            }
        }
    }
    None
}

#[cfg(feature = "ml-models")]
async fn load_model(spec: ModelSpec) -> Result<Arc<dyn SentimentBackend>> {
    let backend = crate::model::ModelBackedSentiment::load(spec).await?;
    Ok(Arc::new(backend))
}

#[cfg(not(feature = "ml-models"))]
async fn load_model(_spec: ModelSpec) -> Result<Arc<dyn SentimentBackend>> {
    Err(commentscope_core::Error::model(
        "Sentiment models require the 'ml-models' feature",
    ))
}

/// Build an analysis pipeline from configuration
///
/// Model load failures are not fatal: the pipeline falls back to the
/// polarity lexicon. An unreadable lexicon file is an error.
pub async fn build_pipeline_from_config(config: &AnalyzerConfig) -> Result<AnalysisPipeline> {
    config.validate()?;
    let lexicon = load_lexicon(config)?;
    let backend = load_backend(&config.models, &lexicon).await;

    let pipeline = AnalysisPipeline::builder()
        .lexicon(lexicon)
        .backend(backend)
        .workers(config.worker_count())
        .progress_interval(config.progress_interval)
        .max_text_chars(config.max_text_chars)
        .confidence_floor(config.confidence_floor)
        .build()?;

    info!(
        backend = pipeline.backend_name(),
        workers = pipeline.workers(),
        "Analysis pipeline ready"
    );

    Ok(pipeline)
}

/// Load configuration from file and build the pipeline
pub async fn init_pipeline_from_file(path: impl AsRef<Path>) -> Result<AnalysisPipeline> {
    let config = load_config(path)?;
    build_pipeline_from_config(&config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelSource;

    #[tokio::test]
    async fn test_default_config_uses_polarity() {
        let pipeline = build_pipeline_from_config(&AnalyzerConfig::default())
            .await
            .unwrap();
        assert!(!pipeline.is_model_backed());
    }

    #[tokio::test]
    async fn test_missing_model_degrades_to_polarity() {
        let dir = tempfile::tempdir().unwrap();
        let config = AnalyzerConfig {
            models: vec![
                ModelSpec {
                    source: ModelSource::Local {
                        path: dir.path().join("nope"),
                    },
                    ..ModelSpec::huggingface("unused")
                },
                ModelSpec {
                    source: ModelSource::Local {
                        path: dir.path().join("also-nope"),
                    },
                    ..ModelSpec::huggingface("unused")
                },
            ],
            workers: 1,
            ..AnalyzerConfig::default()
        };

        let pipeline = build_pipeline_from_config(&config).await.unwrap();
        assert_eq!(pipeline.backend_name(), "polarity-lexicon");
        assert_eq!(pipeline.workers(), 1);
    }

    #[tokio::test]
    async fn test_failed_model_falls_through_to_next() {
        let models = vec![
            ModelSpec::huggingface("org/broken"),
            ModelSpec::huggingface("org/working"),
            ModelSpec::huggingface("org/never-tried"),
        ];
        let mut attempts = Vec::new();

        let backend = first_loadable(&models, |spec| {
            attempts.push(spec.display_name());
            async move {
                if spec.display_name() == "org/broken" {
                    Err(commentscope_core::Error::model("weights missing"))
                } else {
                    let backend: Arc<dyn SentimentBackend> = Arc::new(
                        PolarityFallbackSentiment::new(&Lexicon::default().polarity),
                    );
                    Ok(backend)
                }
            }
        })
        .await;

        assert!(backend.is_some());
        assert_eq!(attempts, vec!["org/broken", "org/working"]);
    }

    #[tokio::test]
    async fn test_no_loadable_model() {
        let models = vec![ModelSpec::huggingface("a"), ModelSpec::huggingface("b")];
        let backend = first_loadable(&models, |_| async {
            Err::<Arc<dyn SentimentBackend>, _>(commentscope_core::Error::model("nope"))
        })
        .await;
        assert!(backend.is_none());
    }

    #[tokio::test]
    async fn test_missing_lexicon_is_error() {
        let config = AnalyzerConfig {
            lexicon_path: Some("/nonexistent/lexicon.yaml".into()),
            ..AnalyzerConfig::default()
        };
        assert!(build_pipeline_from_config(&config).await.is_err());
    }

    #[tokio::test]
    async fn test_init_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let lexicon_path = dir.path().join("lexicon.yaml");
        std::fs::write(&lexicon_path, "strong_negatives: [\"zzz\"]\n").unwrap();

        let config_path = dir.path().join("analyzer.yaml");
        std::fs::write(
            &config_path,
            format!("workers: 2\nlexicon_path: {}\n", lexicon_path.display()),
        )
        .unwrap();

        let pipeline = init_pipeline_from_file(&config_path).await.unwrap();
        assert_eq!(pipeline.workers(), 2);
    }
}
