// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local sentence embeddings with all-MiniLM-L6-v2 on ONNX Runtime.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use ndarray::Array2;
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use ort::value::TensorRef;

use krishi_core::error::KrishiError;
use krishi_core::traits::{EmbeddingAdapter, PluginAdapter};
use krishi_core::types::{AdapterType, EmbeddingInput, EmbeddingOutput, HealthStatus};

/// Output width of all-MiniLM-L6-v2.
pub const EMBEDDING_DIM: usize = 384;

/// Embeds text with a MiniLM ONNX model and its HuggingFace tokenizer.
///
/// Vectors are attention-mask mean pooled and L2 normalised, so a dot
/// product between two of them is their cosine similarity.
pub struct OnnxEmbedder {
    session: Mutex<Session>,
    tokenizer: tokenizers::Tokenizer,
}

// Safety: the session is only touched through the Mutex; tokenizer encoding
// takes `&self` and holds no interior mutability.
unsafe impl Send for OnnxEmbedder {}
unsafe impl Sync for OnnxEmbedder {}

impl OnnxEmbedder {
    /// Loads `model_path` and the `tokenizer.json` next to it.
    pub fn new(model_path: &Path, tokenizer_path: &Path) -> Result<Self, KrishiError> {
        let tokenizer = tokenizers::Tokenizer::from_file(tokenizer_path).map_err(|e| {
            KrishiError::Embedding(format!(
                "failed to load tokenizer from {}: {e}",
                tokenizer_path.display()
            ))
        })?;

        let session = Session::builder()
            .map_err(embedding_err("failed to create session builder"))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(embedding_err("failed to set optimization level"))?
            .with_intra_threads(1)
            .map_err(embedding_err("failed to set thread count"))?
            .commit_from_file(model_path)
            .map_err(|e| {
                KrishiError::Embedding(format!(
                    "failed to load embedding model {}: {e}",
                    model_path.display()
                ))
            })?;

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
        })
    }

    /// Embeds one string.
    pub fn embed_text(&self, text: &str) -> Result<Vec<f32>, KrishiError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| KrishiError::Embedding(format!("tokenization failed: {e}")))?;

        let to_i64 = |xs: &[u32]| xs.iter().map(|&x| i64::from(x)).collect::<Vec<i64>>();
        let ids = to_i64(encoding.get_ids());
        let mask = to_i64(encoding.get_attention_mask());
        let type_ids = to_i64(encoding.get_type_ids());
        let seq_len = ids.len();

        let ids_arr =
            Array2::from_shape_vec((1, seq_len), ids).map_err(embedding_err("bad input shape"))?;
        let mask_arr = Array2::from_shape_vec((1, seq_len), mask.clone())
            .map_err(embedding_err("bad input shape"))?;
        let type_arr = Array2::from_shape_vec((1, seq_len), type_ids)
            .map_err(embedding_err("bad input shape"))?;

        let ids_t =
            TensorRef::from_array_view(&ids_arr).map_err(embedding_err("failed to build tensor"))?;
        let mask_t =
            TensorRef::from_array_view(&mask_arr).map_err(embedding_err("failed to build tensor"))?;
        let type_t =
            TensorRef::from_array_view(&type_arr).map_err(embedding_err("failed to build tensor"))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| KrishiError::Embedding(format!("embedding session poisoned: {e}")))?;

        let outputs = session
            .run(ort::inputs![
                "input_ids" => ids_t,
                "attention_mask" => mask_t,
                "token_type_ids" => type_t
            ])
            .map_err(|e| KrishiError::Embedding(format!("embedding inference failed: {e}")))?;

        // [1, seq_len, hidden]
        let (shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| KrishiError::Embedding(format!("unexpected embedding output: {e}")))?;
        let hidden = shape
            .last()
            .map(|&d| d as usize)
            .ok_or_else(|| KrishiError::Embedding("embedding output has no dimensions".into()))?;

        Ok(l2_normalize(&mean_pool(data, &mask, hidden)))
    }
}

fn embedding_err<E: std::fmt::Display>(context: &'static str) -> impl Fn(E) -> KrishiError {
    move |e| KrishiError::Embedding(format!("{context}: {e}"))
}

/// Averages token vectors whose attention mask is set.
fn mean_pool(hidden_states: &[f32], mask: &[i64], hidden: usize) -> Vec<f32> {
    let mut sum = vec![0.0f32; hidden];
    let mut count = 0usize;
    for (token, _) in hidden_states
        .chunks_exact(hidden)
        .zip(mask)
        .filter(|(_, m)| **m > 0)
    {
        for (acc, v) in sum.iter_mut().zip(token) {
            *acc += v;
        }
        count += 1;
    }
    if count > 0 {
        let n = count as f32;
        sum.iter_mut().for_each(|v| *v /= n);
    }
    sum
}

fn l2_normalize(v: &[f32]) -> Vec<f32> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        v.iter().map(|x| x / norm).collect()
    } else {
        v.to_vec()
    }
}

#[async_trait]
impl PluginAdapter for OnnxEmbedder {
    fn name(&self) -> &str {
        "minilm-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, KrishiError> {
        Ok(match self.session.lock() {
            Ok(_) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(format!("session poisoned: {e}")),
        })
    }
}

#[async_trait]
impl EmbeddingAdapter for OnnxEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, KrishiError> {
        let embeddings = input
            .texts
            .iter()
            .map(|t| self.embed_text(t))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(EmbeddingOutput {
            embeddings,
            dimensions: EMBEDDING_DIM,
        })
    }
}
