// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::types::WeatherSnapshot;

/// Block used in prompts when no weather could be fetched.
pub const WEATHER_UNAVAILABLE_HTML: &str = "<p>Weather data not available.</p>";

/// Renders a snapshot as the HTML block embedded in chatbot prompts.
pub fn weather_context_html(snapshot: Option<&WeatherSnapshot>) -> String {
    let Some(w) = snapshot else {
        return WEATHER_UNAVAILABLE_HTML.to_string();
    };
    format!(
        r#"<div style="background-color: #f0f8ff; padding: 10px; border-radius: 5px;">
    <h4>🌤 Current Weather in {loc}, {region}</h4>
    <p><strong>Temperature:</strong> {temp}°C (Feels like: {feels}°C)</p>
    <p><strong>Conditions:</strong> {cond}</p>
    <p><strong>Humidity:</strong> {hum}%</p>
    <p><strong>Wind:</strong> {wind} kph {dir}</p>
    <p><strong>Rainfall:</strong> {rain} mm</p>
    <p><strong>Cloud Cover:</strong> {cloud}%</p>
    <p><strong>UV Index:</strong> {uv}</p>
</div>"#,
        loc = w.location,
        region = w.region,
        temp = w.temperature,
        feels = w.feels_like,
        cond = w.conditions,
        hum = w.humidity,
        wind = w.wind_speed,
        dir = w.wind_direction,
        rain = w.rainfall,
        cloud = w.cloud_cover,
        uv = w.uv_index,
    )
}
