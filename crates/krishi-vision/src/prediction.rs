// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turning class probabilities into the response shapes served over HTTP.

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use krishi_core::error::KrishiError;
use krishi_core::traits::ClassifierAdapter;

/// Number of ranked alternatives returned with each prediction.
pub const TOP_K: usize = 3;

/// Label separator in PlantVillage class names.
const PLANT_SEPARATOR: &str = "___";

/// One ranked class with its probability as a percentage.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked {
    pub label: String,
    pub confidence: f64,
}

/// Ranks `probabilities` against `labels`, highest first.
///
/// Ties keep model output order. Confidences are percentages rounded to two
/// decimals.
pub fn top_k(probabilities: &[f32], labels: &[String], k: usize) -> Vec<Ranked> {
    let mut indexed: Vec<(usize, f32)> = probabilities.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    indexed
        .into_iter()
        .take(k)
        .filter_map(|(i, p)| {
            labels.get(i).map(|label| Ranked {
                label: label.clone(),
                confidence: percent(p),
            })
        })
        .collect()
}

fn percent(p: f32) -> f64 {
    (f64::from(p) * 10_000.0).round() / 100.0
}

/// Failure body: `{"success": false, "error": "..."}`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Failure {
    pub success: bool,
    pub error: String,
}

impl Failure {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// Either a prediction or a failure body; serialises to whichever it holds.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Outcome<T> {
    Success(T),
    Failure(Failure),
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LabelConfidence {
    pub label: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DiseasePrediction {
    pub success: bool,
    pub predicted_class: String,
    pub plant: String,
    pub disease: String,
    pub confidence: f64,
    pub is_healthy: bool,
    pub top_3_predictions: Vec<LabelConfidence>,
}

impl DiseasePrediction {
    /// Builds the prediction from ranked classes (best first).
    pub fn from_ranked(ranked: Vec<Ranked>) -> Option<Self> {
        let best = ranked.first()?.clone();
        let (plant, disease) = split_plant_label(&best.label);
        let is_healthy = disease.to_lowercase().contains("healthy");
        Some(Self {
            success: true,
            predicted_class: best.label,
            plant,
            disease,
            confidence: best.confidence,
            is_healthy,
            top_3_predictions: ranked
                .into_iter()
                .map(|r| LabelConfidence {
                    label: r.label,
                    confidence: r.confidence,
                })
                .collect(),
        })
    }
}

/// Splits `Plant___Condition` into its parts, with `"Unknown"` for a
/// missing part.
pub fn split_plant_label(label: &str) -> (String, String) {
    let mut parts = label.split(PLANT_SEPARATOR);
    let plant = parts
        .next()
        .filter(|p| !p.is_empty())
        .unwrap_or("Unknown")
        .to_string();
    let disease = parts
        .next()
        .filter(|d| !d.is_empty())
        .unwrap_or("Unknown")
        .to_string();
    (plant, disease)
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PestConfidence {
    pub pest: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PestPrediction {
    pub success: bool,
    pub predicted_pest: String,
    pub confidence: f64,
    pub top_3_predictions: Vec<PestConfidence>,
}

impl PestPrediction {
    pub fn from_ranked(ranked: Vec<Ranked>) -> Option<Self> {
        let best = ranked.first()?.clone();
        Some(Self {
            success: true,
            predicted_pest: best.label,
            confidence: best.confidence,
            top_3_predictions: ranked
                .into_iter()
                .map(|r| PestConfidence {
                    pest: r.label,
                    confidence: r.confidence,
                })
                .collect(),
        })
    }
}

async fn rank(
    classifier: &dyn ClassifierAdapter,
    image: Vec<u8>,
) -> Result<Vec<Ranked>, KrishiError> {
    let probabilities = classifier.classify(image).await?;
    let ranked = top_k(&probabilities, classifier.labels(), TOP_K);
    if ranked.is_empty() {
        return Err(KrishiError::Inference("model returned no scores".into()));
    }
    Ok(ranked)
}

fn failure<T>(model: &str, err: KrishiError) -> Outcome<T> {
    warn!(model, error = %err, "prediction failed");
    Outcome::Failure(Failure::new(err.to_string()))
}

/// Classifies a leaf image into a plant and condition.
#[derive(Clone)]
pub struct DiseaseClassifier {
    model: Arc<dyn ClassifierAdapter>,
}

impl DiseaseClassifier {
    pub fn new(model: Arc<dyn ClassifierAdapter>) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &Arc<dyn ClassifierAdapter> {
        &self.model
    }

    pub async fn predict(&self, image: Vec<u8>) -> Outcome<DiseasePrediction> {
        match rank(self.model.as_ref(), image).await {
            Ok(ranked) => match DiseasePrediction::from_ranked(ranked) {
                Some(p) => Outcome::Success(p),
                None => failure("disease", KrishiError::Inference("empty ranking".into())),
            },
            Err(e) => failure("disease", e),
        }
    }
}

/// Classifies an insect image into a pest class.
#[derive(Clone)]
pub struct PestClassifier {
    model: Arc<dyn ClassifierAdapter>,
}

impl PestClassifier {
    pub fn new(model: Arc<dyn ClassifierAdapter>) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &Arc<dyn ClassifierAdapter> {
        &self.model
    }

    pub async fn predict(&self, image: Vec<u8>) -> Outcome<PestPrediction> {
        match rank(self.model.as_ref(), image).await {
            Ok(ranked) => match PestPrediction::from_ranked(ranked) {
                Some(p) => Outcome::Success(p),
                None => failure("pest", KrishiError::Inference("empty ranking".into())),
            },
            Err(e) => failure("pest", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn top_k_sorts_and_rounds() {
        let ranked = top_k(
            &[0.1, 0.654321, 0.2, 0.045679],
            &labels(&["a", "b", "c", "d"]),
            3,
        );
        let names: Vec<_> = ranked.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(names, vec!["b", "c", "a"]);
        assert_eq!(ranked[0].confidence, 65.43);
        assert_eq!(ranked[1].confidence, 20.0);
    }

    #[test]
    fn top_k_with_fewer_classes() {
        let ranked = top_k(&[0.4, 0.6], &labels(&["x", "y"]), 3);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].label, "y");
    }

    #[test]
    fn ties_keep_model_order() {
        let ranked = top_k(&[0.5, 0.5], &labels(&["first", "second"]), 1);
        assert_eq!(ranked[0].label, "first");
    }

    #[test]
    fn split_label_parts() {
        assert_eq!(
            split_plant_label("Tomato___Late_blight"),
            ("Tomato".to_string(), "Late_blight".to_string())
        );
        assert_eq!(
            split_plant_label("Corn_(maize)___Common_rust_"),
            ("Corn_(maize)".to_string(), "Common_rust_".to_string())
        );
        assert_eq!(
            split_plant_label("Mystery"),
            ("Mystery".to_string(), "Unknown".to_string())
        );
    }

    #[test]
    fn disease_prediction_fields() {
        let ranked = top_k(
            &[0.05, 0.9, 0.05],
            &labels(&["Apple___Black_rot", "Apple___healthy", "Grape___Black_rot"]),
            TOP_K,
        );
        let p = DiseasePrediction::from_ranked(ranked).unwrap();
        assert_eq!(p.predicted_class, "Apple___healthy");
        assert_eq!(p.plant, "Apple");
        assert_eq!(p.disease, "healthy");
        assert!(p.is_healthy);
        assert_eq!(p.confidence, 90.0);
        assert_eq!(p.top_3_predictions[0].label, p.predicted_class);

        let json = serde_json::to_value(Outcome::Success(p)).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["top_3_predictions"][0]["label"], "Apple___healthy");
    }

    #[test]
    fn pest_prediction_json_shape() {
        let ranked = top_k(&[0.2, 0.8], &labels(&["aphids", "beetle"]), TOP_K);
        let p = PestPrediction::from_ranked(ranked).unwrap();
        let json = serde_json::to_value(Outcome::Success(p)).unwrap();
        assert_eq!(json["predicted_pest"], "beetle");
        assert_eq!(json["confidence"], 80.0);
        assert_eq!(json["top_3_predictions"][1]["pest"], "aphids");
    }

    #[test]
    fn failure_json_shape() {
        let outcome: Outcome<PestPrediction> = Outcome::Failure(Failure::new("boom"));
        assert!(!outcome.is_success());
        let json = serde_json::to_value(outcome).unwrap();
        assert_eq!(json, serde_json::json!({"success": false, "error": "boom"}));
    }

    #[test]
    fn empty_ranking_is_none() {
        assert!(DiseasePrediction::from_ranked(Vec::new()).is_none());
        assert!(PestPrediction::from_ranked(Vec::new()).is_none());
    }
}
