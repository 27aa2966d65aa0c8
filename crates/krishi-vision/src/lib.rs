// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plant disease and pest image classification.
//!
//! [`OnnxClassifier`] runs an exported model on ONNX Runtime;
//! [`DiseaseClassifier`] and [`PestClassifier`] wrap any
//! [`ClassifierAdapter`](krishi_core::ClassifierAdapter) and shape its
//! probabilities into the JSON bodies served by the gateway.

pub mod classifier;
pub mod info;
pub mod labels;
pub mod prediction;
pub mod preprocess;

pub use classifier::OnnxClassifier;
pub use info::ModelInfo;
pub use labels::{DISEASE_CLASSES, PEST_CLASSES, load_labels};
pub use prediction::{
    DiseaseClassifier, DiseasePrediction, Failure, Outcome, PestClassifier, PestPrediction, TOP_K,
};
