// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Krishi Mitra, the conversational agricultural assistant.
//!
//! Each query is answered with one language model call whose prompt blends
//! the cached weather for the current location with conversation memory.
//! Failures never escape [`KrishiMitra::ask`]: they come back as an HTML
//! apology in place of the answer.

use std::sync::Arc;

use krishi_config::model::{AgentConfig, LlmConfig};
use krishi_context::{AssembledPrompt, ContextAssembler, PromptTemplate, WeatherContextCache};
use krishi_core::KrishiError;
use krishi_core::traits::ProviderAdapter;
use krishi_core::types::{ProviderMessage, ProviderRequest};
use krishi_llm::parse_output;
use krishi_memory::ConversationMemory;
use krishi_weather::{SharedLocation, WeatherClient, weather_context_html};
use tokio::sync::Mutex;
use tracing::{debug, error, info};

/// Reply used when a query fails.
pub fn apology(err: &KrishiError) -> String {
    format!("<p>Sorry, I encountered an error processing your request: {err}</p>")
}

/// Question asked by [`KrishiMitra::crop_advice`].
pub fn crop_advice_query(crop: &str) -> String {
    format!(
        "Give me specific advice for growing {crop} under the current weather conditions: \
         planting or sowing, irrigation, fertiliser, likely pests and diseases with their \
         management, and harvest timing."
    )
}

/// Sampling settings for every completion.
#[derive(Debug, Clone)]
struct Generation {
    model: String,
    max_tokens: u32,
    temperature: f32,
}

pub struct KrishiMitra {
    provider: Arc<dyn ProviderAdapter>,
    memory: Arc<ConversationMemory>,
    weather: WeatherClient,
    location: SharedLocation,
    /// Held across location write, weather fetch and cache write.
    weather_refresh: Mutex<()>,
    weather_context: WeatherContextCache,
    assembler: ContextAssembler,
    generation: Generation,
}

impl KrishiMitra {
    /// Builds the assistant and fetches weather for the current location.
    pub async fn new(
        provider: Arc<dyn ProviderAdapter>,
        memory: Arc<ConversationMemory>,
        weather: WeatherClient,
        location: SharedLocation,
        agent: &AgentConfig,
        llm: &LlmConfig,
    ) -> Self {
        let weather_context = WeatherContextCache::default();
        let assembler = ContextAssembler::new(
            memory.clone(),
            weather_context.clone(),
            PromptTemplate::new(agent.name.clone()),
        );
        let mitra = Self {
            provider,
            memory,
            weather,
            location,
            weather_refresh: Mutex::new(()),
            weather_context,
            assembler,
            generation: Generation {
                model: llm.model.clone(),
                max_tokens: llm.max_tokens,
                temperature: llm.temperature,
            },
        };
        mitra.refresh_weather().await;
        mitra
    }

    /// Answers `query` as HTML, or returns the apology on failure.
    pub async fn ask(&self, query: &str) -> String {
        match self.try_ask(query).await {
            Ok(answer) => answer,
            Err(e) => {
                error!(error = %e, "failed to answer query");
                apology(&e)
            }
        }
    }

    /// Answers `query`, keeping the failure cause.
    ///
    /// The exchange is saved to memory only after a successful reply.
    pub async fn try_ask(&self, query: &str) -> Result<String, KrishiError> {
        let AssembledPrompt { prompt, .. } = self.assembler.assemble(query).await;

        let request = ProviderRequest {
            model: self.generation.model.clone(),
            messages: vec![ProviderMessage::user(prompt)],
            max_tokens: self.generation.max_tokens,
            temperature: self.generation.temperature,
        };
        let response = self.provider.complete(request).await?;
        if let Some(usage) = response.usage {
            debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "completion usage"
            );
        }

        let answer = parse_output(&response.content);
        self.memory.save(query, &answer).await?;
        Ok(answer)
    }

    /// Crop-specific guidance for the current weather, via [`ask`](Self::ask).
    pub async fn crop_advice(&self, crop: &str) -> String {
        self.ask(&crop_advice_query(crop)).await
    }

    /// Switches location and refreshes the cached weather block.
    pub async fn update_location(&self, location: &str) {
        let _guard = self.weather_refresh.lock().await;
        self.location.set(location).await;
        self.fetch_weather_context(location).await;
        info!(location, "location updated");
    }

    /// Re-fetches weather for the current location into the prompt cache.
    pub async fn refresh_weather(&self) {
        let _guard = self.weather_refresh.lock().await;
        let location = self.location.get().await;
        self.fetch_weather_context(&location).await;
    }

    async fn fetch_weather_context(&self, location: &str) {
        let snapshot = self.weather.fetch(location).await;
        self.weather_context
            .set(weather_context_html(snapshot.as_ref()))
            .await;
    }

    /// Forgets the whole conversation.
    pub async fn clear_memory(&self) {
        self.memory.clear().await;
        info!("conversation memory cleared");
    }

    pub async fn location(&self) -> String {
        self.location.get().await
    }

    /// The weather block currently used in prompts.
    pub async fn weather_context(&self) -> String {
        self.weather_context.get().await
    }

    pub fn memory(&self) -> &Arc<ConversationMemory> {
        &self.memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apology_wraps_error() {
        let err = KrishiError::provider("API returned 503: loading");
        assert_eq!(
            apology(&err),
            "<p>Sorry, I encountered an error processing your request: provider error: API returned 503: loading</p>"
        );
    }

    #[test]
    fn crop_query_names_crop() {
        assert!(crop_advice_query("sugarcane").contains("growing sugarcane"));
    }
}
