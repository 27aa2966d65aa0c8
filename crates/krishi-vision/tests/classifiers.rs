// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use krishi_config::ClassifierConfig;
use krishi_test_utils::MockClassifier;
use krishi_vision::{
    DISEASE_CLASSES, DiseaseClassifier, ModelInfo, Outcome, PEST_CLASSES, PestClassifier,
    load_labels,
};

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

fn disease_probs(hot: usize, second: usize) -> Vec<f32> {
    let mut p = vec![0.0; DISEASE_CLASSES.len()];
    p[hot] = 0.7;
    p[second] = 0.2;
    p[0] += 0.1;
    p
}

#[tokio::test]
async fn disease_prediction_for_late_blight() {
    let late_blight = DISEASE_CLASSES
        .iter()
        .position(|c| *c == "Tomato___Late_blight")
        .unwrap();
    let early_blight = late_blight - 1;
    let model = MockClassifier::new(&DISEASE_CLASSES, disease_probs(late_blight, early_blight));
    let classifier = DiseaseClassifier::new(Arc::new(model));

    let Outcome::Success(p) = classifier.predict(PNG_MAGIC.to_vec()).await else {
        panic!("expected success");
    };
    assert_eq!(p.predicted_class, "Tomato___Late_blight");
    assert_eq!(p.plant, "Tomato");
    assert_eq!(p.disease, "Late_blight");
    assert!(!p.is_healthy);
    assert_eq!(p.confidence, 70.0);
    let top: Vec<_> = p.top_3_predictions.iter().map(|t| t.label.as_str()).collect();
    assert_eq!(
        top,
        vec!["Tomato___Late_blight", "Tomato___Early_blight", "Apple___Apple_scab"]
    );
}

#[tokio::test]
async fn invalid_image_becomes_failure_body() {
    let model = MockClassifier::new(&PEST_CLASSES, vec![0.1; PEST_CLASSES.len()]);
    let classifier = PestClassifier::new(Arc::new(model));

    let outcome = classifier.predict(b"plain text".to_vec()).await;
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["success"], false);
    assert!(
        json["error"]
            .as_str()
            .unwrap()
            .starts_with("failed to preprocess image")
    );
}

#[tokio::test]
async fn pest_prediction_ranks_classes() {
    let mut probs = vec![0.0; PEST_CLASSES.len()];
    probs[3] = 0.6; // bollworm
    probs[8] = 0.3; // stem_borer
    probs[0] = 0.1; // aphids
    let classifier = PestClassifier::new(Arc::new(MockClassifier::new(&PEST_CLASSES, probs)));

    let json = serde_json::to_value(classifier.predict(PNG_MAGIC.to_vec()).await).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["predicted_pest"], "bollworm");
    assert_eq!(json["confidence"], 60.0);
    assert_eq!(json["top_3_predictions"][1]["pest"], "stem_borer");
    assert_eq!(json["top_3_predictions"][2]["pest"], "aphids");
}

#[tokio::test]
async fn empty_scores_are_a_failure() {
    let classifier = PestClassifier::new(Arc::new(MockClassifier::new(&[], Vec::new())));
    assert!(!classifier.predict(PNG_MAGIC.to_vec()).await.is_success());
}

#[test]
fn label_file_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("labels.json");
    std::fs::write(&path, r#"{"0": "locust", "1": "weevil"}"#).unwrap();
    assert_eq!(load_labels(&path).unwrap(), vec!["locust", "weevil"]);
    assert!(load_labels(&dir.path().join("missing.json")).is_err());
}

#[test]
fn model_info_reports_config() {
    let info = ModelInfo::new("pest", &ClassifierConfig::pest(), PEST_CLASSES.len(), false);
    let json = serde_json::to_value(&info).unwrap();
    assert_eq!(json["input_size"], 224);
    assert_eq!(json["normalization"], "mobilenet");
    assert_eq!(json["layout"], "nhwc");
    assert_eq!(json["num_classes"], 9);
    assert_eq!(json["loaded"], false);
}
