// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt assembly for Krishi Mitra.
//!
//! A prompt has three inputs: the cached weather block, the formatted
//! conversation history, and the query itself. [`ContextAssembler`] gathers
//! them concurrently and renders the [`PromptTemplate`].

pub mod history;
pub mod template;

use std::sync::Arc;

use krishi_memory::ConversationMemory;
use krishi_weather::WEATHER_UNAVAILABLE_HTML;
use tokio::sync::RwLock;
use tracing::warn;

pub use history::format_history;
pub use template::PromptTemplate;

/// The weather block currently used in prompts.
#[derive(Debug, Clone)]
pub struct WeatherContextCache(Arc<RwLock<String>>);

impl WeatherContextCache {
    pub fn new(html: impl Into<String>) -> Self {
        Self(Arc::new(RwLock::new(html.into())))
    }

    pub async fn get(&self) -> String {
        self.0.read().await.clone()
    }

    pub async fn set(&self, html: impl Into<String>) {
        *self.0.write().await = html.into();
    }
}

impl Default for WeatherContextCache {
    fn default() -> Self {
        Self::new(WEATHER_UNAVAILABLE_HTML)
    }
}

/// Inputs and rendered text of one prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledPrompt {
    pub weather_context: String,
    pub history: String,
    pub query: String,
    pub prompt: String,
}

pub struct ContextAssembler {
    memory: Arc<ConversationMemory>,
    weather: WeatherContextCache,
    template: PromptTemplate,
}

impl ContextAssembler {
    pub fn new(
        memory: Arc<ConversationMemory>,
        weather: WeatherContextCache,
        template: PromptTemplate,
    ) -> Self {
        Self {
            memory,
            weather,
            template,
        }
    }

    /// Builds the prompt for `query`.
    ///
    /// The three lookups run concurrently. A memory failure is logged and
    /// yields empty history; it never fails the query.
    pub async fn assemble(&self, query: &str) -> AssembledPrompt {
        let (weather_context, history, query) = tokio::join!(
            self.weather.get(),
            self.history(query),
            async { query.to_string() },
        );
        let prompt = self.template.render(&weather_context, &history, &query);
        AssembledPrompt {
            weather_context,
            history,
            query,
            prompt,
        }
    }

    async fn history(&self, query: &str) -> String {
        match self.memory.load(query).await {
            Ok(ctx) => format_history(&ctx),
            Err(e) => {
                warn!(error = %e, "failed to load conversation history");
                String::new()
            }
        }
    }
}
