// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the WeatherAPI.com v1 endpoints.

use std::time::Duration;

use krishi_config::model::WeatherConfig;
use krishi_core::KrishiError;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::types::{CurrentResponse, ForecastResponse, WeatherSnapshot};

/// Environment variable consulted when `weather.api_key` is unset.
pub const API_KEY_ENV: &str = "WEATHER_API_KEY";

/// Fetches current conditions and the daily forecast for a location.
///
/// Every failure (no key, non-200, transport error, bad JSON) is logged and
/// reported as `None` by [`WeatherClient::fetch`].
#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    forecast_days: u8,
}

impl WeatherClient {
    /// Builds a client from config, resolving the key from the environment
    /// when the config leaves it unset.
    pub fn new(config: &WeatherConfig) -> Result<Self, KrishiError> {
        let api_key = resolve_api_key(config);
        if api_key.is_none() {
            warn!("weather API key not configured, weather context disabled");
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| KrishiError::Weather {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            http,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            forecast_days: config.forecast_days,
        })
    }

    /// Points the client at another server (used with wiremock in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Whether a key is available.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Weather for `location`, or `None` when it cannot be obtained.
    pub async fn fetch(&self, location: &str) -> Option<WeatherSnapshot> {
        match self.try_fetch(location).await {
            Ok(snapshot) => {
                debug!(location, resolved = %snapshot.location, "weather fetched");
                Some(snapshot)
            }
            Err(e) => {
                warn!(location, error = %e, "weather unavailable");
                None
            }
        }
    }

    /// Like [`fetch`](Self::fetch) but keeps the failure cause.
    pub async fn try_fetch(&self, location: &str) -> Result<WeatherSnapshot, KrishiError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| KrishiError::weather("weather API key not configured"))?;

        let current: CurrentResponse = self
            .get_json("current.json", &[("key", key), ("q", location), ("aqi", "no")])
            .await?;

        let days = self.forecast_days.to_string();
        let forecast: ForecastResponse = self
            .get_json(
                "forecast.json",
                &[
                    ("key", key),
                    ("q", location),
                    ("days", days.as_str()),
                    ("aqi", "no"),
                    ("alerts", "no"),
                ],
            )
            .await?;

        Ok(WeatherSnapshot::from_wire(current, forecast))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T, KrishiError> {
        let url = reqwest::Url::parse_with_params(&format!("{}/{endpoint}", self.base_url), query)
            .map_err(|e| KrishiError::weather(format!("invalid weather URL: {e}")))?;
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| {
                // The URL carries the API key.
                let e = e.without_url();
                KrishiError::Weather {
                    message: format!("{endpoint} request failed: {e}"),
                    source: Some(Box::new(e)),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(KrishiError::weather(format!(
                "{endpoint} returned status {}",
                status.as_u16()
            )));
        }

        response.json::<T>().await.map_err(|e| {
            let e = e.without_url();
            KrishiError::Weather {
                message: format!("{endpoint} returned malformed body: {e}"),
                source: Some(Box::new(e)),
            }
        })
    }
}

/// Config value first, then [`API_KEY_ENV`]; blank values count as unset.
pub fn resolve_api_key(config: &WeatherConfig) -> Option<String> {
    config
        .api_key
        .clone()
        .or_else(|| std::env::var(API_KEY_ENV).ok())
        .filter(|k| !k.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_key_wins() {
        let config = WeatherConfig {
            api_key: Some("from-config".into()),
            ..Default::default()
        };
        assert_eq!(resolve_api_key(&config).as_deref(), Some("from-config"));
    }

    #[test]
    fn blank_key_is_unset() {
        let config = WeatherConfig {
            api_key: Some("  ".into()),
            ..Default::default()
        };
        // A blank config value is filtered even if the env var is set.
        assert_eq!(resolve_api_key(&config), None);
    }

    #[tokio::test]
    async fn missing_key_yields_none() {
        let config = WeatherConfig {
            api_key: Some(String::new()),
            ..Default::default()
        };
        let client = WeatherClient::new(&config).unwrap();
        assert!(!client.is_configured());
        assert!(client.fetch("Pune").await.is_none());
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn transport_failure_is_logged_without_key() {
        let config = WeatherConfig {
            api_key: Some("very-secret-key".into()),
            ..Default::default()
        };
        let client = WeatherClient::new(&config)
            .unwrap()
            .with_base_url("http://127.0.0.1:9");
        assert!(client.fetch("Pune").await.is_none());
        assert!(logs_contain("weather unavailable"));
        assert!(!logs_contain("very-secret-key"));
    }
}
