//! BERT token-classification recognizer.
//!
//! Downloads `config.json`, `tokenizer.json` and the weights from the
//! HuggingFace Hub, runs the encoder plus the linear classifier head on CPU
//! and decodes BIO tags into entity spans.

use std::collections::HashMap;
use std::path::PathBuf;

use candle_core::{DType, Device, Tensor, D};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use serde::Deserialize;
use tokenizers::Tokenizer;
use tracing::warn;

use super::{EntityRecognizer, RecognizedEntity, RecognizerError};

/// Tokens per forward pass, leaving room for `[CLS]` and `[SEP]`.
const MAX_WINDOW_TOKENS: usize = 510;

#[derive(Debug, Deserialize)]
struct ClassifierConfig {
    hidden_size: usize,
    id2label: HashMap<String, String>,
}

pub struct BertRecognizer {
    model: BertModel,
    classifier: Linear,
    tokenizer: Tokenizer,
    labels: Vec<String>,
    cls_id: u32,
    sep_id: u32,
    device: Device,
}

impl std::fmt::Debug for BertRecognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BertRecognizer")
            .field("labels", &self.labels)
            .field("device", &self.device)
            .finish_non_exhaustive()
    }
}

fn model_err(e: impl std::fmt::Display) -> RecognizerError {
    RecognizerError::ModelLoad(e.to_string())
}

impl BertRecognizer {
    /// Load a token-classification checkpoint from HuggingFace Hub.
    ///
    /// # Errors
    ///
    /// Returns an error if any file fails to download or the weights do not
    /// match the config.
    pub fn load(repo_id: &str) -> Result<Self, RecognizerError> {
        let api = hf_hub::api::sync::Api::new()
            .map_err(|e| model_err(format!("failed to create HuggingFace API client: {e}")))?;
        let repo = api.model(repo_id.to_owned());

        let config_path = repo
            .get("config.json")
            .map_err(|e| model_err(format!("failed to download config.json from {repo_id}: {e}")))?;
        let tokenizer_path = repo.get("tokenizer.json").map_err(|e| {
            model_err(format!("failed to download tokenizer.json from {repo_id}: {e}"))
        })?;

        let raw_config = std::fs::read_to_string(&config_path)
            .map_err(|e| model_err(format!("failed to read model config: {e}")))?;
        let bert_config: BertConfig = serde_json::from_str(&raw_config).map_err(model_err)?;
        let head: ClassifierConfig = serde_json::from_str(&raw_config).map_err(model_err)?;
        let labels = labels_from_id2label(&head.id2label)?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| model_err(format!("failed to load tokenizer: {e}")))?;
        // Windowing is done here; the tokenizer must see the whole text.
        tokenizer
            .with_truncation(None)
            .map_err(|e| model_err(format!("failed to disable truncation: {e}")))?;
        tokenizer.with_padding(None);

        let cls_id = tokenizer
            .token_to_id("[CLS]")
            .ok_or_else(|| model_err("tokenizer has no [CLS] token"))?;
        let sep_id = tokenizer
            .token_to_id("[SEP]")
            .ok_or_else(|| model_err("tokenizer has no [SEP] token"))?;

        let device = Device::Cpu;
        let vb = match repo.get("model.safetensors") {
            // SAFETY: file is a safetensors checkpoint from hf-hub's cache and is not
            // modified while the VarBuilder is alive
            Ok(path) => unsafe {
                VarBuilder::from_mmaped_safetensors(&[path], DType::F32, &device)
                    .map_err(model_err)?
            },
            Err(_) => {
                let path: PathBuf = repo.get("pytorch_model.bin").map_err(|e| {
                    model_err(format!("no usable weights in {repo_id}: {e}"))
                })?;
                VarBuilder::from_pth(&path, DType::F32, &device).map_err(model_err)?
            }
        };

        let model = BertModel::load(vb.clone(), &bert_config).map_err(model_err)?;
        let classifier = candle_nn::linear(head.hidden_size, labels.len(), vb.pp("classifier"))
            .map_err(model_err)?;

        Ok(Self {
            model,
            classifier,
            tokenizer,
            labels,
            cls_id,
            sep_id,
            device,
        })
    }

    fn try_recognize(&self, text: &str) -> Result<Vec<RecognizedEntity>, String> {
        let encoding = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| format!("tokenizer encode failed: {e}"))?;

        let mut tags = Vec::with_capacity(encoding.get_ids().len());
        for window in encoding.get_ids().chunks(MAX_WINDOW_TOKENS) {
            tags.extend(self.classify_window(window).map_err(|e| e.to_string())?);
        }

        Ok(decode_bio(text, encoding.get_offsets(), &tags, &self.labels))
    }

    fn classify_window(&self, window: &[u32]) -> candle_core::Result<Vec<u32>> {
        let mut ids = Vec::with_capacity(window.len() + 2);
        ids.push(self.cls_id);
        ids.extend_from_slice(window);
        ids.push(self.sep_id);

        let input_ids = Tensor::new(ids.as_slice(), &self.device)?.unsqueeze(0)?;
        let token_type_ids = input_ids.zeros_like()?;

        let hidden = self.model.forward(&input_ids, &token_type_ids, None)?;
        let logits = self.classifier.forward(&hidden)?;
        let predictions = logits.squeeze(0)?.argmax(D::Minus1)?.to_vec1::<u32>()?;

        // Drop the [CLS] / [SEP] predictions.
        Ok(predictions[1..predictions.len() - 1].to_vec())
    }
}

impl EntityRecognizer for BertRecognizer {
    fn name(&self) -> &'static str {
        "bert"
    }

    fn recognize(&self, text: &str) -> Vec<RecognizedEntity> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        match self.try_recognize(text) {
            Ok(entities) => entities,
            Err(e) => {
                warn!("BERT recognition failed, returning no entities: {e}");
                Vec::new()
            }
        }
    }
}

fn labels_from_id2label(id2label: &HashMap<String, String>) -> Result<Vec<String>, RecognizerError> {
    let mut labels = vec![String::new(); id2label.len()];
    for (id, label) in id2label {
        let index: usize = id
            .parse()
            .map_err(|_| model_err(format!("non-numeric label id '{id}'")))?;
        let slot = labels
            .get_mut(index)
            .ok_or_else(|| model_err(format!("label id {index} out of range")))?;
        *slot = label.clone();
    }
    if labels.is_empty() {
        return Err(model_err("model config has no id2label"));
    }
    Ok(labels)
}

/// Splits `B-ORG` into `("B", "ORG")`. `O` yields `None`; unprefixed labels
/// are treated as inside tags.
fn split_label(label: &str) -> Option<(&str, &str)> {
    if label == "O" || label.is_empty() {
        return None;
    }
    match label.split_once('-') {
        Some((prefix @ ("B" | "I" | "E" | "S"), kind)) => Some((prefix, kind)),
        _ => Some(("I", label)),
    }
}

/// Groups per-token tags into entity spans over `text`.
///
/// A token continues the open span when it has the same category and either
/// carries an inside tag or directly abuts the previous token (a word piece).
fn decode_bio(
    text: &str,
    offsets: &[(usize, usize)],
    tags: &[u32],
    labels: &[String],
) -> Vec<RecognizedEntity> {
    let mut spans: Vec<(&str, usize, usize)> = Vec::new();
    let mut open = false;

    for (&tag, &(start, end)) in tags.iter().zip(offsets) {
        if start >= end {
            continue;
        }
        let label = labels.get(tag as usize).map(String::as_str).unwrap_or("O");
        let Some((prefix, kind)) = split_label(label) else {
            open = false;
            continue;
        };

        if open {
            if let Some(last) = spans.last_mut() {
                let continues = matches!(prefix, "I" | "E") || start == last.2;
                if last.0 == kind && continues {
                    last.2 = end;
                    continue;
                }
            }
        }
        spans.push((kind, start, end));
        open = true;
    }

    spans
        .into_iter()
        .filter_map(|(kind, start, end)| {
            text.get(start..end)
                .map(|span| RecognizedEntity::from_label(kind, span))
        })
        .collect()
}
