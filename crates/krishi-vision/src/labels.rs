// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in class lists and label file loading.

use std::collections::BTreeMap;
use std::path::Path;

use krishi_core::KrishiError;

/// PlantVillage classes, `Plant___Condition`, in model output order.
pub const DISEASE_CLASSES: [&str; 38] = [
    "Apple___Apple_scab",
    "Apple___Black_rot",
    "Apple___Cedar_apple_rust",
    "Apple___healthy",
    "Blueberry___healthy",
    "Cherry_(including_sour)___Powdery_mildew",
    "Cherry_(including_sour)___healthy",
    "Corn_(maize)___Cercospora_leaf_spot_Gray_leaf_spot",
    "Corn_(maize)___Common_rust_",
    "Corn_(maize)___Northern_Leaf_Blight",
    "Corn_(maize)___healthy",
    "Grape___Black_rot",
    "Grape___Esca_(Black_Measles)",
    "Grape___Leaf_blight_(Isariopsis_Leaf_Spot)",
    "Grape___healthy",
    "Orange___Haunglongbing_(Citrus_greening)",
    "Peach___Bacterial_spot",
    "Peach___healthy",
    "Pepper,_bell___Bacterial_spot",
    "Pepper,_bell___healthy",
    "Potato___Early_blight",
    "Potato___Late_blight",
    "Potato___healthy",
    "Raspberry___healthy",
    "Soybean___healthy",
    "Squash___Powdery_mildew",
    "Strawberry___Leaf_scorch",
    "Strawberry___healthy",
    "Tomato___Bacterial_spot",
    "Tomato___Early_blight",
    "Tomato___Late_blight",
    "Tomato___Leaf_Mold",
    "Tomato___Septoria_leaf_spot",
    "Tomato___Spider_mites_(Two-spotted_spider_mite)",
    "Tomato___Target_Spot",
    "Tomato___Tomato_Yellow_Leaf_Curl_Virus",
    "Tomato___Tomato_mosaic_virus",
    "Tomato___healthy",
];

/// Pest classes in model output order.
pub const PEST_CLASSES: [&str; 9] = [
    "aphids",
    "armyworm",
    "beetle",
    "bollworm",
    "grasshopper",
    "mites",
    "mosquito",
    "sawfly",
    "stem_borer",
];

pub fn builtin(classes: &[&str]) -> Vec<String> {
    classes.iter().map(|c| c.to_string()).collect()
}

/// Reads labels from a JSON file holding either an array of names or an
/// object mapping indices (`"0"`, `"1"`, ...) to names.
///
/// Object indices must cover `0..n` exactly.
pub fn load_labels(path: &Path) -> Result<Vec<String>, KrishiError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        KrishiError::Config(format!("failed to read label file {}: {e}", path.display()))
    })?;
    parse_labels(&text)
        .map_err(|e| KrishiError::Config(format!("invalid label file {}: {e}", path.display())))
}

fn parse_labels(text: &str) -> Result<Vec<String>, String> {
    let value: serde_json::Value = serde_json::from_str(text).map_err(|e| e.to_string())?;
    let labels = match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(|v| match v {
                serde_json::Value::String(s) => Ok(s),
                other => Err(format!("label must be a string, got {other}")),
            })
            .collect::<Result<Vec<_>, _>>()?,
        serde_json::Value::Object(map) => {
            let mut indexed = BTreeMap::new();
            for (k, v) in map {
                let idx: usize = k
                    .parse()
                    .map_err(|_| format!("label index `{k}` is not a number"))?;
                let name = v
                    .as_str()
                    .ok_or_else(|| format!("label {idx} must be a string"))?;
                indexed.insert(idx, name.to_string());
            }
            if indexed.keys().enumerate().any(|(pos, idx)| pos != *idx) {
                return Err("label indices must run from 0 without gaps".into());
            }
            indexed.into_values().collect()
        }
        _ => return Err("expected a JSON array or object".into()),
    };
    if labels.is_empty() {
        return Err("no labels".into());
    }
    Ok(labels)
}
