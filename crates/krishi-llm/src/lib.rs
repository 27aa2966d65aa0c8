// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hosted language model provider for Krishi Mitra.
//!
//! [`HuggingFaceProvider`] implements [`ProviderAdapter`] against the
//! HuggingFace Inference router's OpenAI-compatible chat completions API.
//! The token comes from `llm.api_key` or the `HUGGINGFACE_API_TOKEN`
//! environment variable.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use krishi_config::model::LlmConfig;
use krishi_core::KrishiError;
use krishi_core::traits::{PluginAdapter, ProviderAdapter};
use krishi_core::types::{
    AdapterType, HealthStatus, ProviderRequest, ProviderResponse, TokenUsage,
};
use tracing::info;

use crate::client::HuggingFaceClient;
use crate::types::{ChatCompletionRequest, WireMessage};

/// Environment variable consulted when `llm.api_key` is unset.
pub const API_TOKEN_ENV: &str = "HUGGINGFACE_API_TOKEN";

pub struct HuggingFaceProvider {
    client: HuggingFaceClient,
}

impl HuggingFaceProvider {
    /// Builds the provider; fails when no token is available.
    pub fn new(config: &LlmConfig) -> Result<Self, KrishiError> {
        let token = resolve_api_key(config.api_key.as_deref())?;
        let client = HuggingFaceClient::new(
            &token,
            &config.base_url,
            Duration::from_secs(config.timeout_secs),
        )?;
        info!(model = %config.model, "language model provider initialized");
        Ok(Self { client })
    }

    /// Redirects requests to `base_url` (used with wiremock in tests).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.client = self.client.with_base_url(base_url);
        self
    }
}

/// Config value first, then [`API_TOKEN_ENV`].
pub fn resolve_api_key(config_key: Option<&str>) -> Result<String, KrishiError> {
    if let Some(key) = config_key.filter(|k| !k.trim().is_empty()) {
        return Ok(key.to_string());
    }
    std::env::var(API_TOKEN_ENV)
        .ok()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| {
            KrishiError::Config(format!(
                "HuggingFace API token not found. Set llm.api_key in config or {API_TOKEN_ENV}."
            ))
        })
}

/// Cleans raw model output: trims whitespace and strips a surrounding
/// markdown code fence such as ```` ```html ````.
pub fn parse_output(raw: &str) -> String {
    let text = raw.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text.to_string();
    };
    let Some(body) = rest.strip_suffix("```") else {
        return text.to_string();
    };
    // Drop the info string (e.g. `html`) on the opening line, or directly
    // before the first tag when the fence is on one line.
    let body = match body.split_once('\n') {
        Some((info, inner)) if !info.contains('<') => inner,
        _ => match body.find('<') {
            Some(tag) if body[..tag].chars().all(|c| c.is_ascii_alphanumeric()) => &body[tag..],
            _ => body,
        },
    };
    body.trim().to_string()
}

#[async_trait]
impl PluginAdapter for HuggingFaceProvider {
    fn name(&self) -> &str {
        "huggingface"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, KrishiError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl ProviderAdapter for HuggingFaceProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, KrishiError> {
        let wire = ChatCompletionRequest {
            model: request.model,
            messages: request
                .messages
                .into_iter()
                .map(|m| WireMessage {
                    role: m.role,
                    content: m.content,
                })
                .collect(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream: false,
        };

        let response = self.client.complete(&wire).await?;
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| KrishiError::provider("API returned no content"))?;

        Ok(ProviderResponse {
            content,
            model: response.model.unwrap_or(wire.model),
            usage: response.usage.map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_key_is_used() {
        assert_eq!(resolve_api_key(Some("hf_abc")).unwrap(), "hf_abc");
    }

    #[test]
    fn parse_output_trims() {
        assert_eq!(parse_output("  <p>Hi</p>\n"), "<p>Hi</p>");
    }

    #[test]
    fn parse_output_strips_html_fence() {
        let raw = "```html\n<h3>Irrigation</h3>\n<p>Water at dawn.</p>\n```";
        assert_eq!(parse_output(raw), "<h3>Irrigation</h3>\n<p>Water at dawn.</p>");
    }

    #[test]
    fn parse_output_strips_bare_fence() {
        assert_eq!(parse_output("```\n<p>x</p>\n```"), "<p>x</p>");
    }

    #[test]
    fn parse_output_strips_single_line_fence() {
        assert_eq!(parse_output("```html<p>x</p>```"), "<p>x</p>");
        assert_eq!(parse_output("```<p>x</p>```"), "<p>x</p>");
    }

    #[test]
    fn parse_output_keeps_leading_text_in_single_line_fence() {
        assert_eq!(parse_output("```Water at dawn <b>now</b>```"), "Water at dawn <b>now</b>");
    }

    #[test]
    fn parse_output_keeps_unbalanced_fence() {
        assert_eq!(parse_output("```html\n<p>x</p>"), "```html\n<p>x</p>");
    }
}
