// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Weather record returned to callers and the WeatherAPI.com wire types it
//! is built from.

use serde::{Deserialize, Serialize};

/// Current conditions plus the daily forecast for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location: String,
    pub region: String,
    pub country: String,
    /// Degrees Celsius.
    pub temperature: f64,
    /// Degrees Celsius.
    pub feels_like: f64,
    pub conditions: String,
    /// Percent.
    pub humidity: u32,
    /// Kilometres per hour.
    pub wind_speed: f64,
    pub wind_direction: String,
    /// Millimetres; zero when the provider omits it.
    pub rainfall: f64,
    /// Percent.
    pub cloud_cover: u32,
    pub uv_index: f64,
    /// Provider `forecastday` entries, passed through untouched.
    pub forecast: Vec<serde_json::Value>,
}

impl WeatherSnapshot {
    pub(crate) fn from_wire(current: CurrentResponse, forecast: ForecastResponse) -> Self {
        let CurrentResponse { location, current } = current;
        Self {
            location: location.name,
            region: location.region,
            country: location.country,
            temperature: current.temp_c,
            feels_like: current.feelslike_c,
            conditions: current.condition.text,
            humidity: current.humidity,
            wind_speed: current.wind_kph,
            wind_direction: current.wind_dir,
            rainfall: current.precip_mm.unwrap_or(0.0),
            cloud_cover: current.cloud,
            uv_index: current.uv,
            forecast: forecast.forecast.forecastday,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CurrentResponse {
    location: WireLocation,
    current: WireCurrent,
}

#[derive(Debug, Deserialize)]
struct WireLocation {
    name: String,
    #[serde(default)]
    region: String,
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct WireCurrent {
    temp_c: f64,
    feelslike_c: f64,
    condition: WireCondition,
    humidity: u32,
    wind_kph: f64,
    wind_dir: String,
    #[serde(default)]
    precip_mm: Option<f64>,
    cloud: u32,
    uv: f64,
}

#[derive(Debug, Deserialize)]
struct WireCondition {
    text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ForecastResponse {
    forecast: WireForecast,
}

#[derive(Debug, Deserialize)]
struct WireForecast {
    #[serde(default)]
    forecastday: Vec<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_precip_defaults_to_zero() {
        let current: CurrentResponse = serde_json::from_str(
            r#"{"location":{"name":"Pune","region":"Maharashtra","country":"India"},
                "current":{"temp_c":31.0,"feelslike_c":33.5,"condition":{"text":"Sunny"},
                "humidity":40,"wind_kph":11.2,"wind_dir":"W","cloud":0,"uv":8.0}}"#,
        )
        .unwrap();
        let forecast: ForecastResponse =
            serde_json::from_str(r#"{"forecast":{"forecastday":[{"date":"2026-10-17"}]}}"#)
                .unwrap();

        let snap = WeatherSnapshot::from_wire(current, forecast);
        assert_eq!(snap.location, "Pune");
        assert_eq!(snap.rainfall, 0.0);
        assert_eq!(snap.forecast.len(), 1);
        assert_eq!(snap.forecast[0]["date"], "2026-10-17");
    }
}
