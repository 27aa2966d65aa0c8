// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod classifier;
pub mod embedding;
pub mod provider;

pub use adapter::PluginAdapter;
pub use classifier::ClassifierAdapter;
pub use embedding::EmbeddingAdapter;
pub use provider::ProviderAdapter;
