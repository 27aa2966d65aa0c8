// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Krishi services.
//!
//! Provides the trait definitions, error type, and common types used by the
//! weather, memory, language model, vision and gateway crates.

pub mod error;
pub mod traits;
pub mod types;

pub use error::KrishiError;
pub use types::{AdapterType, HealthStatus};

pub use traits::{ClassifierAdapter, EmbeddingAdapter, PluginAdapter, ProviderAdapter};
