// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Image classifier adapter trait.

use async_trait::async_trait;

use crate::error::KrishiError;
use crate::traits::adapter::PluginAdapter;

/// Adapter wrapping a pretrained image classification model.
///
/// Implementations own decoding, preprocessing and the forward pass, and
/// return a probability distribution aligned with [`labels`](Self::labels).
#[async_trait]
pub trait ClassifierAdapter: PluginAdapter {
    /// Class labels, indexed by model output position.
    fn labels(&self) -> &[String];

    /// Runs the model on encoded image bytes and returns class probabilities.
    async fn classify(&self, image: Vec<u8>) -> Result<Vec<f32>, KrishiError>;
}
