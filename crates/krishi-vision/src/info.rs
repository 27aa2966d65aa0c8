// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::Serialize;

use krishi_config::model::{ClassifierConfig, Normalization, TensorLayout};

/// Static description of a classifier, reported by `/models/info/`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ModelInfo {
    pub name: String,
    pub model_path: String,
    pub input_size: u32,
    pub normalization: Normalization,
    pub layout: TensorLayout,
    pub num_classes: usize,
    pub loaded: bool,
}

impl ModelInfo {
    pub fn new(name: &str, config: &ClassifierConfig, num_classes: usize, loaded: bool) -> Self {
        Self {
            name: name.to_string(),
            model_path: config.model_path.clone(),
            input_size: config.input_size,
            normalization: config.normalization,
            layout: config.layout,
            num_classes,
            loaded,
        }
    }
}
