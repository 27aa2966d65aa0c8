// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the API.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use krishi_agent::KrishiMitra;
use krishi_config::model::ServerConfig;
use krishi_core::KrishiError;
use krishi_vision::{DiseaseClassifier, ModelInfo, PestClassifier};
use krishi_weather::{SharedLocation, WeatherClient};

use crate::handlers;

/// Classifier descriptions reported by `/models/info/`.
#[derive(Debug, Clone, Serialize)]
pub struct ModelsInfo {
    pub disease_model: ModelInfo,
    pub pest_model: ModelInfo,
}

/// Shared state for axum request handlers.
///
/// Optional members are absent when their component failed to start; the
/// routes that need them answer 503.
#[derive(Clone)]
pub struct AppState {
    pub chatbot: Option<Arc<KrishiMitra>>,
    pub disease: Option<DiseaseClassifier>,
    pub pest: Option<PestClassifier>,
    pub models: Arc<ModelsInfo>,
    /// Used by the weather routes directly, independent of the chatbot.
    pub weather: WeatherClient,
    /// Same handle the chatbot holds, so a location change is seen by both.
    pub location: SharedLocation,
    pub start_time: Instant,
}

/// Builds the application router with CORS, tracing and the upload limit.
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/disease-prediction/", post(handlers::disease_prediction))
        .route("/pest-prediction/", post(handlers::pest_prediction))
        .route(
            "/chatbot/",
            get(handlers::chatbot_query).post(handlers::chatbot_body),
        )
        .route("/crop-advice/", get(handlers::crop_advice))
        .route("/weather/", get(handlers::current_weather))
        .route("/weather/{location}", get(handlers::weather_for))
        .route("/set-location/", put(handlers::set_location))
        .route("/clear-memory/", post(handlers::clear_memory))
        .route("/health/", get(handlers::health))
        .route("/models/info/", get(handlers::models_info))
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Binds `host:port` and serves until Ctrl-C.
pub async fn start_server(config: &ServerConfig, state: AppState) -> Result<(), KrishiError> {
    let max_upload_bytes = config.max_upload_mb.saturating_mul(1024 * 1024);
    let app = router(state, max_upload_bytes);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| KrishiError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| KrishiError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
