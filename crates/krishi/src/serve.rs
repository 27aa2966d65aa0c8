// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `krishi serve` command implementation.
//!
//! Builds the weather client, the chatbot and both classifiers, then hands
//! them to the gateway. A component that fails to start is logged and left
//! out; its routes answer 503.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use krishi_agent::KrishiMitra;
use krishi_config::model::{ClassifierConfig, KrishiConfig};
use krishi_core::error::KrishiError;
use krishi_core::traits::ClassifierAdapter;
use krishi_gateway::{AppState, ModelsInfo, start_server};
use krishi_llm::HuggingFaceProvider;
use krishi_memory::{ConversationMemory, ModelManager, OnnxEmbedder};
use krishi_vision::labels::builtin;
use krishi_vision::{
    DISEASE_CLASSES, DiseaseClassifier, ModelInfo, OnnxClassifier, PEST_CLASSES, PestClassifier,
};
use krishi_weather::{SharedLocation, WeatherClient};
use tracing::{info, warn};

/// Runs the `krishi serve` command.
pub async fn run_serve(config: KrishiConfig) -> Result<(), KrishiError> {
    init_tracing(&config.agent.log_level);

    info!(version = env!("CARGO_PKG_VERSION"), "starting krishi serve");

    let start_time = Instant::now();
    let data_dir = config.agent.data_path();
    let location = SharedLocation::new(config.agent.default_location.clone());
    let weather = WeatherClient::new(&config.weather)?;

    let chatbot = match initialize_chatbot(&config, weather.clone(), location.clone()).await {
        Ok(bot) => {
            info!(name = %config.agent.name, "chatbot initialized");
            Some(Arc::new(bot))
        }
        Err(e) => {
            warn!(error = %e, "chatbot initialization failed, continuing without chatbot");
            None
        }
    };

    let (disease, disease_info) = load_classifier(
        "disease",
        &config.disease_model,
        &data_dir,
        builtin(&DISEASE_CLASSES),
    );
    let (pest, pest_info) =
        load_classifier("pest", &config.pest_model, &data_dir, builtin(&PEST_CLASSES));

    let state = AppState {
        chatbot,
        disease: disease.map(DiseaseClassifier::new),
        pest: pest.map(PestClassifier::new),
        models: Arc::new(ModelsInfo {
            disease_model: disease_info,
            pest_model: pest_info,
        }),
        weather,
        location,
        start_time,
    };

    start_server(&config.server, state).await
}

/// Provider, embedder and memory, then the assistant itself.
async fn initialize_chatbot(
    config: &KrishiConfig,
    weather: WeatherClient,
    location: SharedLocation,
) -> Result<KrishiMitra, KrishiError> {
    let provider = Arc::new(HuggingFaceProvider::new(&config.llm)?);

    let model_manager = ModelManager::new(config.agent.data_path(), &config.memory.model_name);
    info!("ensuring embedding model is available...");
    let (model_path, tokenizer_path) = model_manager
        .ensure_model(config.memory.auto_download)
        .await?;
    info!(path = %model_path.display(), "embedding model ready");

    let embedder = Arc::new(OnnxEmbedder::new(&model_path, &tokenizer_path)?);
    let memory = Arc::new(ConversationMemory::new(embedder, &config.memory));

    Ok(KrishiMitra::new(
        provider,
        memory,
        weather,
        location,
        &config.agent,
        &config.llm,
    )
    .await)
}

fn load_classifier(
    name: &str,
    config: &ClassifierConfig,
    data_dir: &Path,
    default_labels: Vec<String>,
) -> (Option<Arc<dyn ClassifierAdapter>>, ModelInfo) {
    if !config.enabled {
        info!(model = name, "classifier disabled by configuration");
        return (None, ModelInfo::new(name, config, default_labels.len(), false));
    }
    let fallback_classes = default_labels.len();
    match OnnxClassifier::load(name, config, data_dir, default_labels) {
        Ok(classifier) => {
            let info = ModelInfo::new(name, config, classifier.labels().len(), true);
            let classifier: Arc<dyn ClassifierAdapter> = Arc::new(classifier);
            (Some(classifier), info)
        }
        Err(e) => {
            warn!(model = name, error = %e, "classifier failed to load, continuing without it");
            (None, ModelInfo::new(name, config, fallback_classes, false))
        }
    }
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("krishi={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
