// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic stand-ins for the language model, embedder and image
//! classifiers, so tests run without network access or model files.

pub mod mock_classifier;
pub mod mock_embedder;
pub mod mock_provider;

pub use mock_classifier::MockClassifier;
pub use mock_embedder::MockEmbedder;
pub use mock_provider::MockProvider;
