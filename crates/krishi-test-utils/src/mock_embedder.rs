// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use krishi_core::KrishiError;
use krishi_core::traits::{EmbeddingAdapter, PluginAdapter};
use krishi_core::types::{AdapterType, EmbeddingInput, EmbeddingOutput, HealthStatus};

/// Width of mock vectors.
pub const MOCK_DIM: usize = 64;

/// Bag-of-words embedder: each lower-cased word is hashed into one of
/// [`MOCK_DIM`] buckets and the counts are L2 normalised. Texts sharing
/// words are therefore similar, which is enough to exercise retrieval.
#[derive(Default)]
pub struct MockEmbedder {
    fail: AtomicBool,
    calls: AtomicUsize,
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following call fail (or succeed again).
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Number of texts embedded so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn vector(text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; MOCK_DIM];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut h = DefaultHasher::new();
            word.to_lowercase().hash(&mut h);
            v[(h.finish() as usize) % MOCK_DIM] += 1.0;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        v
    }
}

#[async_trait]
impl PluginAdapter for MockEmbedder {
    fn name(&self) -> &str {
        "mock-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, KrishiError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl EmbeddingAdapter for MockEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, KrishiError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(KrishiError::Embedding("mock embedder failure".into()));
        }
        self.calls.fetch_add(input.texts.len(), Ordering::SeqCst);
        Ok(EmbeddingOutput {
            embeddings: input.texts.iter().map(|t| Self::vector(t)).collect(),
            dimensions: MOCK_DIM,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_words_are_closer() {
        let dot = |a: &[f32], b: &[f32]| a.iter().zip(b).map(|(x, y)| x * y).sum::<f32>();
        let wheat = MockEmbedder::vector("wheat sowing time");
        let wheat2 = MockEmbedder::vector("best wheat sowing");
        let cotton = MockEmbedder::vector("cotton bollworm spray");
        assert!(dot(&wheat, &wheat2) > dot(&wheat, &cotton));
    }

    #[tokio::test]
    async fn failure_toggle() {
        let e = MockEmbedder::new();
        e.set_failing(true);
        let input = EmbeddingInput {
            texts: vec!["x".into()],
        };
        assert!(e.embed(input.clone()).await.is_err());
        e.set_failing(false);
        assert_eq!(e.embed(input).await.unwrap().embeddings.len(), 1);
        assert_eq!(e.calls(), 1);
    }
}
