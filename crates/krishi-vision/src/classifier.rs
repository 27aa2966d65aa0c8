// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! ONNX Runtime image classifier.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use ort::value::TensorRef;
use tracing::{debug, info};

use krishi_config::model::{ClassifierConfig, Normalization, TensorLayout};
use krishi_core::error::KrishiError;
use krishi_core::traits::{ClassifierAdapter, PluginAdapter};
use krishi_core::types::{AdapterType, HealthStatus};

use crate::labels::load_labels;
use crate::preprocess::{preprocess, softmax};

/// A single-input, single-output image classifier.
///
/// The session is loaded once and shared; each request preprocesses and
/// runs on the blocking pool.
pub struct OnnxClassifier {
    inner: Arc<Inner>,
}

struct Inner {
    name: String,
    session: Mutex<Session>,
    labels: Vec<String>,
    input_size: u32,
    normalization: Normalization,
    layout: TensorLayout,
    apply_softmax: bool,
}

impl OnnxClassifier {
    /// Loads the model named by `config`, taking labels from
    /// `config.labels_path` when set and `default_labels` otherwise.
    pub fn load(
        name: &str,
        config: &ClassifierConfig,
        data_dir: &Path,
        default_labels: Vec<String>,
    ) -> Result<Self, KrishiError> {
        let model_path = config.resolved_model_path(data_dir);
        if !model_path.exists() {
            return Err(KrishiError::ModelNotLoaded(format!(
                "{name}: {} does not exist",
                model_path.display()
            )));
        }

        let labels = match config.resolved_labels_path(data_dir) {
            Some(path) => load_labels(&path)?,
            None => default_labels,
        };

        let session = Session::builder()
            .map_err(inference_err("failed to create session builder"))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(inference_err("failed to set optimization level"))?
            .commit_from_file(&model_path)
            .map_err(|e| {
                KrishiError::ModelNotLoaded(format!(
                    "{name}: failed to load {}: {e}",
                    model_path.display()
                ))
            })?;

        info!(
            model = name,
            path = %model_path.display(),
            classes = labels.len(),
            input_size = config.input_size,
            "classifier loaded"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                name: name.to_string(),
                session: Mutex::new(session),
                labels,
                input_size: config.input_size,
                normalization: config.normalization,
                layout: config.layout,
                apply_softmax: config.apply_softmax,
            }),
        })
    }
}

impl Inner {
    fn run(&self, bytes: &[u8]) -> Result<Vec<f32>, KrishiError> {
        let input = preprocess(bytes, self.input_size, self.normalization, self.layout)?;
        let tensor =
            TensorRef::from_array_view(&input).map_err(inference_err("failed to build tensor"))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| KrishiError::Inference(format!("{} session poisoned: {e}", self.name)))?;
        let outputs = session
            .run(ort::inputs![tensor])
            .map_err(inference_err("forward pass failed"))?;
        let (_, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(inference_err("unexpected model output"))?;

        if data.len() != self.labels.len() {
            return Err(KrishiError::Inference(format!(
                "{} produced {} scores for {} labels",
                self.name,
                data.len(),
                self.labels.len()
            )));
        }
        debug!(model = %self.name, "forward pass complete");

        Ok(if self.apply_softmax {
            softmax(data)
        } else {
            data.to_vec()
        })
    }
}

fn inference_err<E: std::fmt::Display>(context: &'static str) -> impl Fn(E) -> KrishiError {
    move |e| KrishiError::Inference(format!("{context}: {e}"))
}

#[async_trait]
impl PluginAdapter for OnnxClassifier {
    fn name(&self) -> &str {
        &self.inner.name
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Classifier
    }

    async fn health_check(&self) -> Result<HealthStatus, KrishiError> {
        Ok(match self.inner.session.lock() {
            Ok(_) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(format!("session poisoned: {e}")),
        })
    }
}

#[async_trait]
impl ClassifierAdapter for OnnxClassifier {
    fn labels(&self) -> &[String] {
        &self.inner.labels
    }

    async fn classify(&self, image: Vec<u8>) -> Result<Vec<f32>, KrishiError> {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || inner.run(&image))
            .await
            .map_err(|e| KrishiError::Internal(format!("classifier task failed: {e}")))?
    }
}
