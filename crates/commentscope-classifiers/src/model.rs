//! Model-backed sentiment using Candle
//!
//! Loads a BERT or DistilBERT sequence classification checkpoint (local
//! directory or HuggingFace Hub) and reports the top label with its softmax
//! probability. Inference is CPU-bound and runs on the blocking pool.

use crate::backend::{LabelScheme, Prediction, SentimentBackend};
use crate::config::{Architecture, DeviceSpec, ModelSource, ModelSpec};
use candle_core::{DType, Device, IndexOp, Tensor, D};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use candle_transformers::models::distilbert::{Config as DistilBertConfig, DistilBertModel};
use commentscope_core::{Error, Result};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokenizers::{Tokenizer, TruncationDirection};

fn model_err<E: Display>(context: &'static str) -> impl FnOnce(E) -> Error {
    move |e| Error::model(format!("{}: {}", context, e))
}

/// Sentiment backend running a transformer classifier
pub struct ModelBackedSentiment {
    name: String,
    scheme: LabelScheme,
    inner: Arc<SequenceClassifier>,
}

impl ModelBackedSentiment {
    /// Resolve, download if needed, and load the configured model
    pub async fn load(spec: ModelSpec) -> Result<Self> {
        tokio::task::spawn_blocking(move || Self::load_blocking(&spec))
            .await
            .map_err(model_err("Model loading task failed"))?
    }

    fn load_blocking(spec: &ModelSpec) -> Result<Self> {
        let name = spec.display_name();
        tracing::info!("Loading sentiment model '{}'", name);

        let model_dir = resolve_model_dir(&spec.source)?;
        let device = get_device(spec.device)?;
        let inner = SequenceClassifier::load(&model_dir, spec, device)?;

        let scheme = spec
            .labels
            .map(|labels| labels.to_label_scheme())
            .unwrap_or_else(|| LabelScheme::infer(&inner.labels));

        tracing::info!(
            "Loaded {:?} sentiment model '{}' with labels {:?} ({:?})",
            inner.architecture,
            name,
            inner.labels,
            scheme
        );

        Ok(Self {
            name,
            scheme,
            inner: Arc::new(inner),
        })
    }

    /// Model output labels, in logit order
    pub fn labels(&self) -> &[String] {
        &self.inner.labels
    }
}

#[async_trait::async_trait]
impl SentimentBackend for ModelBackedSentiment {
    async fn classify(&self, text: &str) -> Result<Prediction> {
        let start = Instant::now();
        let inner = Arc::clone(&self.inner);
        let text = text.to_string();

        let (label, score) = tokio::task::spawn_blocking(move || inner.predict(&text))
            .await
            .map_err(model_err("Inference task failed"))??;

        Ok(Prediction {
            label,
            score,
            model: Some(self.name.clone()),
            latency_us: start.elapsed().as_micros() as u64,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn label_scheme(&self) -> LabelScheme {
        self.scheme
    }
}

enum Encoder {
    Bert {
        model: BertModel,
        pooler: Option<Linear>,
    },
    DistilBert {
        model: DistilBertModel,
        pre_classifier: Option<Linear>,
    },
}

struct SequenceClassifier {
    architecture: Architecture,
    tokenizer: Tokenizer,
    encoder: Encoder,
    head: Linear,
    device: Device,
    labels: Vec<String>,
    max_length: usize,
}

impl SequenceClassifier {
    fn load(model_dir: &Path, spec: &ModelSpec, device: Device) -> Result<Self> {
        let tokenizer = load_tokenizer(model_dir)?;
        let config_json = std::fs::read_to_string(model_dir.join("config.json"))
            .map_err(model_err("Failed to read config.json"))?;
        let labels = id2label(&config_json)?;
        let architecture = resolve_architecture(spec.architecture, &config_json)?;
        let vb = load_var_builder(model_dir, &device)?;

        let (encoder, hidden_size) = match architecture {
            Architecture::Bert => {
                let config: BertConfig = serde_json::from_str(&config_json)
                    .map_err(model_err("Failed to parse BERT config"))?;
                let model = BertModel::load(vb.pp("bert"), &config)
                    .map_err(model_err("Failed to load BERT model"))?;
                let pooler = candle_nn::linear(
                    config.hidden_size,
                    config.hidden_size,
                    vb.pp("bert.pooler.dense"),
                )
                .ok();
                (Encoder::Bert { model, pooler }, config.hidden_size)
            }
            Architecture::DistilBert => {
                let config: DistilBertConfig = serde_json::from_str(&config_json)
                    .map_err(model_err("Failed to parse DistilBERT config"))?;
                let hidden_size = hidden_size(&config_json);
                let model = DistilBertModel::load(vb.pp("distilbert"), &config)
                    .map_err(model_err("Failed to load DistilBERT model"))?;
                let pre_classifier =
                    candle_nn::linear(hidden_size, hidden_size, vb.pp("pre_classifier")).ok();
                (
                    Encoder::DistilBert {
                        model,
                        pre_classifier,
                    },
                    hidden_size,
                )
            }
        };

        let head = candle_nn::linear(hidden_size, labels.len(), vb.pp("classifier"))
            .map_err(model_err("Failed to load classification head"))?;

        Ok(Self {
            architecture,
            tokenizer,
            encoder,
            head,
            device,
            labels,
            max_length: spec.max_length,
        })
    }

    /// Top label and its probability
    fn predict(&self, text: &str) -> Result<(String, f32)> {
        let mut encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(model_err("Tokenization failed"))?;
        encoding.truncate(self.max_length, 0, TruncationDirection::Right);

        let input_ids = Tensor::new(encoding.get_ids(), &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(model_err("Failed to create input tensor"))?;

        let pooled = match &self.encoder {
            Encoder::Bert { model, pooler } => {
                let token_type_ids = Tensor::new(encoding.get_type_ids(), &self.device)
                    .and_then(|t| t.unsqueeze(0))
                    .map_err(model_err("Failed to create token type tensor"))?;
                let hidden = model
                    .forward(&input_ids, &token_type_ids, None)
                    .map_err(model_err("Model forward pass failed"))?;
                let cls = cls_embedding(&hidden)?;
                match pooler {
                    Some(pooler) => pooler
                        .forward(&cls)
                        .and_then(|t| t.tanh())
                        .map_err(model_err("Pooler failed"))?,
                    None => cls,
                }
            }
            Encoder::DistilBert {
                model,
                pre_classifier,
            } => {
                // DistilBERT masks positions where the mask is 1
                let inverted: Vec<u8> = encoding
                    .get_attention_mask()
                    .iter()
                    .map(|&m| u8::from(m == 0))
                    .collect();
                let mask = Tensor::new(inverted.as_slice(), &self.device)
                    .and_then(|t| t.unsqueeze(0))
                    .map_err(model_err("Failed to create attention mask"))?;
                let hidden = model
                    .forward(&input_ids, &mask)
                    .map_err(model_err("Model forward pass failed"))?;
                let cls = cls_embedding(&hidden)?;
                match pre_classifier {
                    Some(pre) => pre
                        .forward(&cls)
                        .and_then(|t| t.relu())
                        .map_err(model_err("Pre-classifier failed"))?,
                    None => cls,
                }
            }
        };

        let logits = self
            .head
            .forward(&pooled)
            .map_err(model_err("Classification head failed"))?;
        let probs: Vec<f32> = candle_nn::ops::softmax(&logits, D::Minus1)
            .and_then(|t| t.squeeze(0))
            .and_then(|t| t.to_vec1())
            .map_err(model_err("Softmax failed"))?;

        let (idx, score) = probs
            .iter()
            .copied()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .ok_or_else(|| Error::model("Model produced no logits"))?;

        let label = self
            .labels
            .get(idx)
            .cloned()
            .unwrap_or_else(|| format!("LABEL_{}", idx));

        Ok((label, score))
    }
}

fn cls_embedding(hidden: &Tensor) -> Result<Tensor> {
    hidden
        .i((0, 0, ..))
        .and_then(|t| t.unsqueeze(0))
        .map_err(model_err("Failed to get CLS token"))
}

fn get_device(device: DeviceSpec) -> Result<Device> {
    match device {
        DeviceSpec::Cpu => Ok(Device::Cpu),
        DeviceSpec::Cuda => Device::new_cuda(0).map_err(model_err("Failed to initialize CUDA")),
        DeviceSpec::Metal => {
            Device::new_metal(0).map_err(model_err("Failed to initialize Metal"))
        }
    }
}

fn resolve_model_dir(source: &ModelSource) -> Result<PathBuf> {
    match source {
        ModelSource::Local { path } => {
            if !path.exists() {
                return Err(Error::model(format!(
                    "Model path does not exist: {}",
                    path.display()
                )));
            }
            Ok(path.clone())
        }
        ModelSource::HuggingFace { repo, revision } => download_from_huggingface(repo, revision),
    }
}

/// Download cache shared by all CommentScope processes
fn model_cache_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".cache/commentscope/models")
}

fn download_from_huggingface(repo: &str, revision: &str) -> Result<PathBuf> {
    use hf_hub::{api::sync::ApiBuilder, Repo, RepoType};

    tracing::info!("Fetching model from HuggingFace: {} @ {}", repo, revision);

    let api = ApiBuilder::new()
        .with_cache_dir(model_cache_dir())
        .build()
        .map_err(model_err("Failed to initialize HuggingFace API"))?;
    let repo_obj = api.repo(Repo::with_revision(
        repo.to_string(),
        RepoType::Model,
        revision.to_string(),
    ));

    let config_path = repo_obj
        .get("config.json")
        .map_err(model_err("Failed to download config.json"))?;

    let has_weights = ["model.safetensors", "pytorch_model.bin"]
        .iter()
        .any(|file| repo_obj.get(file).is_ok());
    if !has_weights {
        return Err(Error::model(
            "No model weights found (tried model.safetensors, pytorch_model.bin)",
        ));
    }

    let has_tokenizer = ["tokenizer.json", "vocab.txt"]
        .iter()
        .any(|file| repo_obj.get(file).is_ok());
    if !has_tokenizer {
        return Err(Error::model(
            "No tokenizer found (tried tokenizer.json, vocab.txt)",
        ));
    }

    let model_dir = config_path
        .parent()
        .ok_or_else(|| Error::model("Invalid cache path"))?;

    tracing::info!("Model available at: {}", model_dir.display());
    Ok(model_dir.to_path_buf())
}

fn load_var_builder(model_dir: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let safetensors = model_dir.join("model.safetensors");
    if safetensors.exists() {
        // SAFETY: the file is memory-mapped read-only and not modified while loaded
        return unsafe {
            VarBuilder::from_mmaped_safetensors(&[safetensors], DType::F32, device)
                .map_err(model_err("Failed to load weights"))
        };
    }

    let pytorch = model_dir.join("pytorch_model.bin");
    if pytorch.exists() {
        tracing::debug!("Loading weights from pytorch_model.bin");
        return VarBuilder::from_pth(&pytorch, DType::F32, device)
            .map_err(model_err("Failed to load weights"));
    }

    Err(Error::model(format!(
        "No weights found in {}",
        model_dir.display()
    )))
}

fn load_tokenizer(model_dir: &Path) -> Result<Tokenizer> {
    let tokenizer_json = model_dir.join("tokenizer.json");
    if tokenizer_json.exists() {
        return Tokenizer::from_file(&tokenizer_json).map_err(model_err("Failed to load tokenizer.json"));
    }

    let vocab_path = model_dir.join("vocab.txt");
    if vocab_path.exists() {
        tracing::debug!("Building tokenizer from vocab.txt");

        use tokenizers::models::wordpiece::WordPiece;
        use tokenizers::normalizers::BertNormalizer;
        use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
        use tokenizers::processors::bert::BertProcessing;

        let wordpiece = WordPiece::from_file(vocab_path.to_string_lossy().as_ref())
            .unk_token("[UNK]".to_string())
            .build()
            .map_err(model_err("Failed to build WordPiece model"))?;

        let mut tokenizer = Tokenizer::new(wordpiece);
        tokenizer.with_normalizer(Some(BertNormalizer::default()));
        tokenizer.with_pre_tokenizer(Some(BertPreTokenizer));
        tokenizer.with_post_processor(Some(BertProcessing::new(
            ("[SEP]".to_string(), 102),
            ("[CLS]".to_string(), 101),
        )));

        return Ok(tokenizer);
    }

    Err(Error::model(format!(
        "No tokenizer found in {} (tried tokenizer.json, vocab.txt)",
        model_dir.display()
    )))
}

/// Configured architecture, else the one named by `model_type`
fn resolve_architecture(configured: Option<Architecture>, config_json: &str) -> Result<Architecture> {
    if let Some(architecture) = configured {
        return Ok(architecture);
    }

    let value: serde_json::Value = serde_json::from_str(config_json)?;
    let model_type = value
        .get("model_type")
        .and_then(|t| t.as_str())
        .ok_or_else(|| Error::model("config.json has no model_type; set architecture explicitly"))?;

    Architecture::from_model_type(model_type)
        .ok_or_else(|| Error::model(format!("Unsupported model_type '{}'", model_type)))
}

/// Labels from `id2label`, ordered by id
fn id2label(config_json: &str) -> Result<Vec<String>> {
    let value: serde_json::Value = serde_json::from_str(config_json)?;
    let Some(map) = value.get("id2label").and_then(|v| v.as_object()) else {
        return Ok(vec!["NEGATIVE".to_string(), "POSITIVE".to_string()]);
    };

    let mut entries = map
        .iter()
        .map(|(id, label)| {
            let id: usize = id
                .parse()
                .map_err(|_| Error::model(format!("Invalid id2label key '{}'", id)))?;
            let label = label.as_str().unwrap_or_default().to_string();
            Ok((id, label))
        })
        .collect::<Result<Vec<_>>>()?;
    entries.sort_by_key(|(id, _)| *id);

    Ok(entries.into_iter().map(|(_, label)| label).collect())
}

fn hidden_size(config_json: &str) -> usize {
    serde_json::from_str::<serde_json::Value>(config_json)
        .ok()
        .and_then(|v| {
            v.get("dim")
                .or_else(|| v.get("hidden_size"))
                .and_then(|d| d.as_u64())
        })
        .unwrap_or(768) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id2label_ordering() {
        let config = r#"{"id2label": {"1": "2 stars", "0": "1 star", "10": "x", "2": "3 stars"}}"#;
        assert_eq!(id2label(config).unwrap(), vec!["1 star", "2 stars", "3 stars", "x"]);
    }

    #[test]
    fn test_id2label_default_binary() {
        assert_eq!(id2label("{}").unwrap(), vec!["NEGATIVE", "POSITIVE"]);
        assert!(id2label(r#"{"id2label": {"zero": "a"}}"#).is_err());
    }

    #[test]
    fn test_resolve_architecture() {
        let distil = r#"{"model_type": "distilbert"}"#;
        assert_eq!(
            resolve_architecture(None, distil).unwrap(),
            Architecture::DistilBert
        );
        assert_eq!(
            resolve_architecture(Some(Architecture::Bert), distil).unwrap(),
            Architecture::Bert
        );
        assert_eq!(
            resolve_architecture(None, r#"{"model_type": "bert"}"#).unwrap(),
            Architecture::Bert
        );
        assert!(resolve_architecture(None, r#"{"model_type": "gpt2"}"#).is_err());
        assert!(resolve_architecture(None, "{}").is_err());
    }

    #[test]
    fn test_hidden_size() {
        assert_eq!(hidden_size(r#"{"dim": 384}"#), 384);
        assert_eq!(hidden_size(r#"{"hidden_size": 1024}"#), 1024);
        assert_eq!(hidden_size("{}"), 768);
    }

    #[tokio::test]
    async fn test_missing_local_model_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let spec = ModelSpec {
            source: ModelSource::Local {
                path: dir.path().join("missing"),
            },
            ..ModelSpec::huggingface("unused")
        };

        let err = ModelBackedSentiment::load(spec).await.err().unwrap();
        assert!(err.to_string().contains("does not exist"));
    }

    #[tokio::test]
    async fn test_model_dir_without_tokenizer() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), "{}").unwrap();
        let spec = ModelSpec {
            source: ModelSource::Local {
                path: dir.path().to_path_buf(),
            },
            ..ModelSpec::huggingface("unused")
        };

        let err = ModelBackedSentiment::load(spec).await.err().unwrap();
        assert!(err.to_string().contains("No tokenizer found"));
    }
}
