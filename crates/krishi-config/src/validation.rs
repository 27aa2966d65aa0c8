// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks that serde attributes cannot express.

use crate::diagnostic::ConfigError;
use crate::model::{ClassifierConfig, KrishiConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Checks the whole configuration, collecting every problem found.
pub fn validate_config(config: &KrishiConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::invalid("server", "host must not be empty"));
    } else if host.parse::<std::net::IpAddr>().is_err()
        && !host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        errors.push(ConfigError::invalid(
            "server",
            format!("host `{host}` is not an IP address or hostname"),
        ));
    }
    if config.server.port == 0 {
        errors.push(ConfigError::invalid("server", "port must be non-zero"));
    }
    if config.server.max_upload_mb == 0 {
        errors.push(ConfigError::invalid("server", "max_upload_mb must be non-zero"));
    }

    if config.agent.default_location.trim().is_empty() {
        errors.push(ConfigError::invalid(
            "agent",
            "default_location must not be empty",
        ));
    }
    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        errors.push(ConfigError::invalid(
            "agent",
            format!(
                "log_level `{}` must be one of {}",
                config.agent.log_level,
                LOG_LEVELS.join(", ")
            ),
        ));
    }
    if config.agent.data_dir.trim().is_empty() {
        errors.push(ConfigError::invalid("agent", "data_dir must not be empty"));
    }

    if config.weather.timeout_secs == 0 {
        errors.push(ConfigError::invalid("weather", "timeout_secs must be positive"));
    }
    if !(1..=14).contains(&config.weather.forecast_days) {
        errors.push(ConfigError::invalid(
            "weather",
            format!(
                "forecast_days must be between 1 and 14, got {}",
                config.weather.forecast_days
            ),
        ));
    }

    if config.llm.timeout_secs == 0 {
        errors.push(ConfigError::invalid("llm", "timeout_secs must be positive"));
    }
    if config.llm.max_tokens == 0 {
        errors.push(ConfigError::invalid("llm", "max_tokens must be positive"));
    }
    if !(0.0..=2.0).contains(&config.llm.temperature) {
        errors.push(ConfigError::invalid(
            "llm",
            format!("temperature must be in [0, 2], got {}", config.llm.temperature),
        ));
    }
    if config.llm.model.trim().is_empty() {
        errors.push(ConfigError::invalid("llm", "model must not be empty"));
    }

    let memory = &config.memory;
    if memory.k == 0 {
        errors.push(ConfigError::invalid("memory", "k must be at least 1"));
    }
    if memory.k > memory.fetch_k {
        errors.push(ConfigError::invalid(
            "memory",
            format!("k ({}) must not exceed fetch_k ({})", memory.k, memory.fetch_k),
        ));
    }
    if !(0.0..=1.0).contains(&memory.lambda_mult) {
        errors.push(ConfigError::invalid(
            "memory",
            format!("lambda_mult must be in [0, 1], got {}", memory.lambda_mult),
        ));
    }

    check_classifier("disease_model", &config.disease_model, &mut errors);
    check_classifier("pest_model", &config.pest_model, &mut errors);

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn check_classifier(section: &str, model: &ClassifierConfig, errors: &mut Vec<ConfigError>) {
    if !model.enabled {
        return;
    }
    if model.input_size == 0 {
        errors.push(ConfigError::invalid(section, "input_size must be non-zero"));
    }
    if model.model_path.trim().is_empty() {
        errors.push(ConfigError::invalid(section, "model_path must not be empty"));
    }
}
