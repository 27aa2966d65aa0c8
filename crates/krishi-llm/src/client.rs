// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the HuggingFace router's chat completions endpoint.

use std::time::Duration;

use krishi_core::KrishiError;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::debug;

use crate::types::{ApiErrorResponse, ChatCompletionRequest, ChatCompletionResponse};

/// Sends single, non-streaming completion requests. No retries.
#[derive(Debug, Clone)]
pub struct HuggingFaceClient {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl HuggingFaceClient {
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self, KrishiError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| KrishiError::Config(format!("invalid API token header value: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, auth);
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| KrishiError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            endpoint: endpoint_for(base_url),
            timeout,
        })
    }

    /// Points the client at another server (used with wiremock in tests).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.endpoint = endpoint_for(base_url);
        self
    }

    pub async fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, KrishiError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    KrishiError::Timeout {
                        duration: self.timeout,
                    }
                } else {
                    KrishiError::Provider {
                        message: format!("HTTP request failed: {e}"),
                        source: Some(Box::new(e)),
                    }
                }
            })?;

        let status = response.status();
        debug!(status = %status, model = %request.model, "completion response received");

        let body = response.text().await.map_err(|e| KrishiError::Provider {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|r| r.error.message().to_string())
                .unwrap_or(body);
            return Err(KrishiError::provider(format!(
                "API returned {}: {detail}",
                status.as_u16()
            )));
        }

        serde_json::from_str(&body).map_err(|e| KrishiError::Provider {
            message: format!("failed to parse API response: {e}"),
            source: Some(Box::new(e)),
        })
    }
}

fn endpoint_for(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_appends_path_once() {
        assert_eq!(
            endpoint_for("https://router.huggingface.co/v1/"),
            "https://router.huggingface.co/v1/chat/completions"
        );
    }

    #[test]
    fn rejects_unprintable_token() {
        let err = HuggingFaceClient::new("bad\ntoken", "http://x", Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, KrishiError::Config(_)));
    }
}
