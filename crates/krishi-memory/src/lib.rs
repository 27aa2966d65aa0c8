// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation memory for the Krishi Mitra chatbot.
//!
//! A [`ConversationBuffer`] holds the recent transcript verbatim and a
//! [`VectorIndex`] holds an embedding of every turn for maximal marginal
//! relevance retrieval. [`ConversationMemory`] keeps the two in step.
//! Embeddings come from any [`EmbeddingAdapter`](krishi_core::traits::EmbeddingAdapter);
//! [`OnnxEmbedder`] runs all-MiniLM-L6-v2 locally.

pub mod embedder;
pub mod index;
pub mod model_manager;
pub mod store;
pub mod transcript;
pub mod types;

pub use embedder::{EMBEDDING_DIM, OnnxEmbedder};
pub use index::{MmrParams, VectorIndex, mmr_select};
pub use model_manager::ModelManager;
pub use store::ConversationMemory;
pub use transcript::ConversationBuffer;
pub use types::{ChatMessage, ConversationTurn, MemoryContext, MessageRole};
