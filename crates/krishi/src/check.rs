// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `krishi check-config` command implementation.
//!
//! Prints the effective configuration and whether each optional component
//! has what it needs to start. Secrets are reported as set or unset only.

use krishi_config::model::{ClassifierConfig, KrishiConfig};
use krishi_core::error::KrishiError;
use krishi_memory::ModelManager;

/// Runs the `krishi check-config` command.
pub fn run_check_config(config: &KrishiConfig) -> Result<(), KrishiError> {
    println!();
    println!("  krishi check-config");
    println!("  {}", "-".repeat(50));
    for line in summary_lines(config) {
        println!("  {line}");
    }
    println!();
    println!("  configuration is valid");
    Ok(())
}

fn set_or_unset(present: bool) -> &'static str {
    if present { "set" } else { "unset" }
}

fn classifier_line(name: &str, config: &ClassifierConfig, data_dir: &std::path::Path) -> String {
    if !config.enabled {
        return format!("{name} model: disabled");
    }
    let path = config.resolved_model_path(data_dir);
    format!(
        "{name} model: {} ({}, {}px, {:?}/{:?})",
        path.display(),
        if path.exists() { "found" } else { "missing" },
        config.input_size,
        config.normalization,
        config.layout,
    )
}

/// One line per setting, in display order.
pub fn summary_lines(config: &KrishiConfig) -> Vec<String> {
    let data_dir = config.agent.data_path();
    let weather_key = krishi_weather::resolve_api_key(&config.weather).is_some();
    let llm_key = krishi_llm::resolve_api_key(config.llm.api_key.as_deref()).is_ok();
    let embedder =
        ModelManager::new(data_dir.clone(), &config.memory.model_name).is_model_available();

    vec![
        format!("server: {}:{}", config.server.host, config.server.port),
        format!("upload limit: {} MB", config.server.max_upload_mb),
        format!("data dir: {}", data_dir.display()),
        format!("default location: {}", config.agent.default_location),
        format!("weather api key: {}", set_or_unset(weather_key)),
        format!("llm: {} via {}", config.llm.model, config.llm.base_url),
        format!("llm api key: {}", set_or_unset(llm_key)),
        format!(
            "memory: window {}, k {}, fetch_k {}, lambda {}",
            config.memory.transcript_window,
            config.memory.k,
            config.memory.fetch_k,
            config.memory.lambda_mult
        ),
        format!(
            "embedding model: {} ({})",
            config.memory.model_name,
            if embedder {
                "cached"
            } else if config.memory.auto_download {
                "downloads on first start"
            } else {
                "missing"
            }
        ),
        classifier_line("disease", &config.disease_model, &data_dir),
        classifier_line("pest", &config.pest_model, &data_dir),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &std::path::Path) -> KrishiConfig {
        let mut config = KrishiConfig::default();
        config.agent.data_dir = dir.display().to_string();
        config.weather.api_key = Some("weather-secret".into());
        config
    }

    #[test]
    fn summary_never_prints_secrets() {
        let dir = tempfile::tempdir().unwrap();
        let lines = summary_lines(&config_in(dir.path()));
        assert!(lines.contains(&"weather api key: set".to_string()));
        assert!(lines.iter().all(|l| !l.contains("weather-secret")));
    }

    #[test]
    fn reports_model_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.pest_model.enabled = false;
        std::fs::create_dir_all(dir.path().join("models")).unwrap();
        std::fs::write(dir.path().join("models/disease_model.onnx"), b"onnx").unwrap();

        let lines = summary_lines(&config);
        let disease = lines.iter().find(|l| l.starts_with("disease model")).unwrap();
        assert!(disease.contains("found"));
        assert!(disease.contains("Imagenet/Nchw"));
        assert!(lines.contains(&"pest model: disabled".to_string()));
    }
}
