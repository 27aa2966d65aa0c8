// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live weather for Krishi.
//!
//! [`WeatherClient`] talks to WeatherAPI.com and never fails loudly: callers
//! get `Option<WeatherSnapshot>`. [`weather_context_html`] turns a snapshot
//! into the block embedded in chatbot prompts, and [`SharedLocation`] holds
//! the location both use.

pub mod client;
pub mod html;
pub mod location;
pub mod types;

pub use client::{WeatherClient, resolve_api_key};
pub use html::{WEATHER_UNAVAILABLE_HTML, weather_context_html};
pub use location::SharedLocation;
pub use types::WeatherSnapshot;
