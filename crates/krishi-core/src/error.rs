// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared by every Krishi crate.

use thiserror::Error;

/// The primary error type used across all Krishi adapter traits and services.
#[derive(Debug, Error)]
pub enum KrishiError {
    /// Configuration errors (invalid TOML, missing API key, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Language model provider errors (API failure, malformed output).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Weather provider errors (non-200 status, network failure, bad JSON).
    #[error("weather error: {message}")]
    Weather {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Embedding model errors (tokenizer, ONNX session, empty output).
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Image classifier inference errors.
    #[error("inference error: {0}")]
    Inference(String),

    /// The uploaded bytes could not be decoded or preprocessed as an image.
    #[error("failed to preprocess image: {0}")]
    InvalidImage(String),

    /// A model required by the request was not loaded at startup.
    #[error("model not loaded: {0}")]
    ModelNotLoaded(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl KrishiError {
    /// Shorthand for a provider error without an underlying source.
    pub fn provider(message: impl Into<String>) -> Self {
        KrishiError::Provider {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a weather error without an underlying source.
    pub fn weather(message: impl Into<String>) -> Self {
        KrishiError::Weather {
            message: message.into(),
            source: None,
        }
    }
}
