// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key is
//! rejected at startup instead of being silently ignored.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level Krishi configuration.
///
/// Every section is optional and defaults to values that run the full
/// service locally (models under the data directory, keys from env vars).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KrishiConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Assistant identity, default location and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// WeatherAPI.com settings.
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Hosted language model settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Conversation memory settings.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Plant disease classifier.
    #[serde(default = "ClassifierConfig::disease")]
    pub disease_model: ClassifierConfig,

    /// Pest classifier.
    #[serde(default = "ClassifierConfig::pest")]
    pub pest_model: ClassifierConfig,
}

impl Default for KrishiConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            agent: AgentConfig::default(),
            weather: WeatherConfig::default(),
            llm: LlmConfig::default(),
            memory: MemoryConfig::default(),
            disease_model: ClassifierConfig::disease(),
            pest_model: ClassifierConfig::pest(),
        }
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum accepted upload size for image endpoints, in megabytes.
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_max_upload_mb() -> usize {
    10
}

/// Assistant identity and process-wide settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name used in the prompt.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Location used for weather until `set-location` is called.
    #[serde(default = "default_location")]
    pub default_location: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Root directory for downloaded and bundled model files.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            default_location: default_location(),
            log_level: default_log_level(),
            data_dir: default_data_dir(),
        }
    }
}

impl AgentConfig {
    /// The data directory as a path.
    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }
}

fn default_agent_name() -> String {
    "Krishi Mitra".to_string()
}

fn default_location() -> String {
    "Pune".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_data_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("krishi"))
        .unwrap_or_else(|| PathBuf::from("data"))
        .to_string_lossy()
        .into_owned()
}

/// WeatherAPI.com configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WeatherConfig {
    /// API key. `None` falls back to the `WEATHER_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the v1 API.
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_weather_timeout_secs")]
    pub timeout_secs: u64,

    /// Number of forecast days requested.
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u8,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            timeout_secs: default_weather_timeout_secs(),
            forecast_days: default_forecast_days(),
        }
    }
}

fn default_weather_base_url() -> String {
    "http://api.weatherapi.com/v1".to_string()
}

fn default_weather_timeout_secs() -> u64 {
    10
}

fn default_forecast_days() -> u8 {
    7
}

/// Hosted language model configuration (OpenAI-compatible chat completions).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LlmConfig {
    /// API token. `None` falls back to the `HUGGINGFACE_API_TOKEN` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL; `/chat/completions` is appended.
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    /// Model repository id.
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum new tokens per response.
    #[serde(default = "default_llm_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds.
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            temperature: default_temperature(),
            max_tokens: default_llm_max_tokens(),
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

fn default_llm_base_url() -> String {
    "https://router.huggingface.co/v1".to_string()
}

fn default_llm_model() -> String {
    "meta-llama/Meta-Llama-3-8B-Instruct".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_llm_max_tokens() -> u32 {
    512
}

fn default_llm_timeout_secs() -> u64 {
    120
}

/// Conversation memory configuration.
///
/// Controls the transcript window and the MMR retrieval over past turns.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Number of most recent turns kept in the transcript. `0` keeps all.
    #[serde(default = "default_transcript_window")]
    pub transcript_window: usize,

    /// Number of past turns returned by similarity retrieval.
    #[serde(default = "default_k")]
    pub k: usize,

    /// Number of nearest candidates considered before MMR re-ranking.
    #[serde(default = "default_fetch_k")]
    pub fetch_k: usize,

    /// MMR trade-off: 1.0 = pure relevance, 0.0 = pure diversity.
    #[serde(default = "default_lambda_mult")]
    pub lambda_mult: f32,

    /// Name of the sentence embedding model directory.
    #[serde(default = "default_embedding_model")]
    pub model_name: String,

    /// Download the embedding model on first run when it is missing.
    #[serde(default = "default_auto_download")]
    pub auto_download: bool,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            transcript_window: default_transcript_window(),
            k: default_k(),
            fetch_k: default_fetch_k(),
            lambda_mult: default_lambda_mult(),
            model_name: default_embedding_model(),
            auto_download: default_auto_download(),
        }
    }
}

fn default_transcript_window() -> usize {
    10
}

fn default_k() -> usize {
    5
}

fn default_fetch_k() -> usize {
    10
}

fn default_lambda_mult() -> f32 {
    0.7
}

fn default_embedding_model() -> String {
    "all-MiniLM-L6-v2".to_string()
}

fn default_auto_download() -> bool {
    true
}

/// Pixel normalisation applied after resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// `(x / 255 - mean) / std` with ImageNet statistics.
    Imagenet,
    /// `x / 255`.
    UnitScale,
    /// `x / 127.5 - 1`, as Keras MobileNet `preprocess_input`.
    Mobilenet,
}

/// Tensor memory layout expected by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TensorLayout {
    /// `[1, 3, H, W]` (PyTorch exports).
    Nchw,
    /// `[1, H, W, 3]` (Keras exports).
    Nhwc,
}

/// Configuration for one image classifier.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifierConfig {
    /// Load this model at startup.
    pub enabled: bool,

    /// Path to the ONNX model. Relative paths resolve against `agent.data_dir`.
    pub model_path: String,

    /// Optional label file (JSON array, or object of index -> name).
    #[serde(default)]
    pub labels_path: Option<String>,

    /// Square input resolution in pixels.
    pub input_size: u32,

    /// Pixel normalisation scheme.
    pub normalization: Normalization,

    /// Input tensor layout.
    pub layout: TensorLayout,

    /// Apply softmax to the model output (false when the graph ends in softmax).
    pub apply_softmax: bool,
}

impl ClassifierConfig {
    /// Defaults for the ResNet-50 PlantVillage disease model.
    pub fn disease() -> Self {
        Self {
            enabled: true,
            model_path: "models/disease_model.onnx".to_string(),
            labels_path: None,
            input_size: 224,
            normalization: Normalization::Imagenet,
            layout: TensorLayout::Nchw,
            apply_softmax: true,
        }
    }

    /// Defaults for the MobileNet pest model.
    pub fn pest() -> Self {
        Self {
            enabled: true,
            model_path: "models/pest_classifier.onnx".to_string(),
            labels_path: None,
            input_size: 224,
            normalization: Normalization::Mobilenet,
            layout: TensorLayout::Nhwc,
            apply_softmax: false,
        }
    }

    /// Resolves `model_path` against the data directory.
    pub fn resolved_model_path(&self, data_dir: &std::path::Path) -> PathBuf {
        resolve(data_dir, &self.model_path)
    }

    /// Resolves `labels_path` against the data directory, if set.
    pub fn resolved_labels_path(&self, data_dir: &std::path::Path) -> Option<PathBuf> {
        self.labels_path.as_deref().map(|p| resolve(data_dir, p))
    }
}

fn resolve(data_dir: &std::path::Path, path: &str) -> PathBuf {
    let p = PathBuf::from(path);
    if p.is_absolute() { p } else { data_dir.join(p) }
}
