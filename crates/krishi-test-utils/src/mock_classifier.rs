// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;

use krishi_core::KrishiError;
use krishi_core::traits::{ClassifierAdapter, PluginAdapter};
use krishi_core::types::{AdapterType, HealthStatus};

/// Classifier returning fixed probabilities for any input.
///
/// Inputs that do not start with a PNG, JPEG or WebP signature are rejected
/// as invalid images, mirroring a real decoder.
pub struct MockClassifier {
    labels: Vec<String>,
    probabilities: Vec<f32>,
}

impl MockClassifier {
    pub fn new(labels: &[&str], probabilities: Vec<f32>) -> Self {
        Self {
            labels: labels.iter().map(|l| l.to_string()).collect(),
            probabilities,
        }
    }
}

fn looks_like_image(bytes: &[u8]) -> bool {
    bytes.starts_with(b"\x89PNG")
        || bytes.starts_with(&[0xFF, 0xD8, 0xFF])
        || (bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP")
}

#[async_trait]
impl PluginAdapter for MockClassifier {
    fn name(&self) -> &str {
        "mock-classifier"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Classifier
    }

    async fn health_check(&self) -> Result<HealthStatus, KrishiError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl ClassifierAdapter for MockClassifier {
    fn labels(&self) -> &[String] {
        &self.labels
    }

    async fn classify(&self, image: Vec<u8>) -> Result<Vec<f32>, KrishiError> {
        if !looks_like_image(&image) {
            return Err(KrishiError::InvalidImage("unrecognised image format".into()));
        }
        Ok(self.probabilities.clone())
    }
}
