// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transcript and similarity index kept in step behind one lock.

use std::sync::Arc;

use krishi_config::model::MemoryConfig;
use krishi_core::error::KrishiError;
use krishi_core::traits::EmbeddingAdapter;
use krishi_core::types::EmbeddingInput;
use tokio::sync::Mutex;
use tracing::debug;

use crate::index::{MmrParams, VectorIndex};
use crate::transcript::ConversationBuffer;
use crate::types::{ConversationTurn, MemoryContext};

struct MemoryState {
    buffer: ConversationBuffer,
    index: VectorIndex,
}

/// Conversation memory combining the recent transcript with MMR retrieval
/// over every turn seen since the last clear.
///
/// Embedding happens before the lock is taken; a turn is written to both
/// stores or to neither.
pub struct ConversationMemory {
    embedder: Arc<dyn EmbeddingAdapter>,
    params: MmrParams,
    state: Mutex<MemoryState>,
}

impl ConversationMemory {
    pub fn new(embedder: Arc<dyn EmbeddingAdapter>, config: &MemoryConfig) -> Self {
        Self {
            embedder,
            params: MmrParams {
                k: config.k,
                fetch_k: config.fetch_k,
                lambda_mult: config.lambda_mult,
            },
            state: Mutex::new(MemoryState {
                buffer: ConversationBuffer::new(config.transcript_window),
                index: VectorIndex::new(),
            }),
        }
    }

    /// Transcript messages plus retrieved turns that fell out of the window.
    pub async fn load(&self, query: &str) -> Result<MemoryContext, KrishiError> {
        let needs_search = !self.state.lock().await.index.is_empty();
        let query_vec = if needs_search {
            Some(self.embed_one(query).await?)
        } else {
            None
        };

        let state = self.state.lock().await;
        let relevant = match query_vec {
            Some(v) => state
                .index
                .search_mmr(&v, self.params)
                .into_iter()
                .filter(|t| !state.buffer.contains(&t.id))
                .collect(),
            None => Vec::new(),
        };
        Ok(MemoryContext {
            messages: state.buffer.messages(),
            relevant,
        })
    }

    /// Records a completed exchange in both stores.
    pub async fn save(&self, query: &str, answer: &str) -> Result<ConversationTurn, KrishiError> {
        let turn = ConversationTurn::new(query, answer);
        let embedding = self.embed_one(&turn.document()).await?;

        let mut state = self.state.lock().await;
        state.buffer.push(turn.clone());
        state.index.add(turn.clone(), embedding);
        debug!(turn_id = %turn.id, indexed = state.index.len(), "turn saved");
        Ok(turn)
    }

    /// Forgets every turn in both stores.
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.buffer.clear();
        state.index.clear();
    }

    /// Number of turns in the transcript and in the index.
    pub async fn sizes(&self) -> (usize, usize) {
        let state = self.state.lock().await;
        (state.buffer.len(), state.index.len())
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, KrishiError> {
        self.embedder
            .embed(EmbeddingInput {
                texts: vec![text.to_string()],
            })
            .await?
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| KrishiError::Embedding("embedder returned no vectors".into()))
    }
}
