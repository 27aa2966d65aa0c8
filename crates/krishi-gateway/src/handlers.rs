// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use krishi_agent::KrishiMitra;
use krishi_core::traits::{ClassifierAdapter, PluginAdapter};
use krishi_core::types::HealthStatus;
use krishi_vision::{DiseasePrediction, Outcome, PestPrediction};

use crate::error::ApiError;
use crate::server::{AppState, ModelsInfo};

/// Multipart field carrying the uploaded image.
const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Deserialize)]
pub struct CropQuery {
    pub crop_name: String,
}

#[derive(Debug, Serialize)]
pub struct AdviceResponse {
    pub advice: String,
}

#[derive(Debug, Deserialize)]
pub struct LocationParams {
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub disease_model: bool,
    pub pest_model: bool,
    pub chatbot: bool,
}

/// Reads the `file` part of a multipart upload.
async fn read_upload(mut multipart: Multipart) -> Result<Vec<u8>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(UPLOAD_FIELD) {
            return Ok(field.bytes().await?.to_vec());
        }
    }
    Err(ApiError::BadRequest(format!(
        "missing multipart field `{UPLOAD_FIELD}`"
    )))
}

fn chatbot(state: &AppState) -> Result<&Arc<KrishiMitra>, ApiError> {
    state.chatbot.as_ref().ok_or(ApiError::ChatbotUnavailable)
}

/// POST /disease-prediction/
pub async fn disease_prediction(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Outcome<DiseasePrediction>>, ApiError> {
    let classifier = state
        .disease
        .as_ref()
        .ok_or(ApiError::ModelUnavailable("disease"))?;
    let image = read_upload(multipart).await?;
    Ok(Json(classifier.predict(image).await))
}

/// POST /pest-prediction/
pub async fn pest_prediction(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Outcome<PestPrediction>>, ApiError> {
    let classifier = state
        .pest
        .as_ref()
        .ok_or(ApiError::ModelUnavailable("pest"))?;
    let image = read_upload(multipart).await?;
    Ok(Json(classifier.predict(image).await))
}

/// GET /chatbot/?query=
pub async fn chatbot_query(
    State(state): State<AppState>,
    query: Result<Query<ChatRequest>, QueryRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Query(req) = query?;
    answer(&state, &req.query).await
}

/// POST /chatbot/ with `{"query": "..."}`.
pub async fn chatbot_body(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    answer(&state, &req.query).await
}

async fn answer(state: &AppState, query: &str) -> Result<Json<ChatResponse>, ApiError> {
    let bot = chatbot(state)?;
    Ok(Json(ChatResponse {
        response: bot.ask(query).await,
    }))
}

/// GET /crop-advice/?crop_name=
pub async fn crop_advice(
    State(state): State<AppState>,
    query: Result<Query<CropQuery>, QueryRejection>,
) -> Result<Json<AdviceResponse>, ApiError> {
    let Query(req) = query?;
    let bot = chatbot(&state)?;
    Ok(Json(AdviceResponse {
        advice: bot.crop_advice(&req.crop_name).await,
    }))
}

/// GET /weather/ for the current location.
pub async fn current_weather(State(state): State<AppState>) -> Response {
    let location = state.location.get().await;
    weather_response(&state, &location).await
}

/// GET /weather/{location}; the shared location is left unchanged.
pub async fn weather_for(
    State(state): State<AppState>,
    Path(location): Path<String>,
) -> Response {
    weather_response(&state, &location).await
}

async fn weather_response(state: &AppState, location: &str) -> Response {
    match state.weather.fetch(location).await {
        Some(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        None => ApiError::NotFound(format!("Weather data not available for {location}"))
            .into_response(),
    }
}

/// PUT /set-location/ with `?location=` or `{"location": "..."}`.
///
/// The query parameter wins when both are given.
pub async fn set_location(
    State(state): State<AppState>,
    Query(params): Query<LocationParams>,
    body: Bytes,
) -> Result<Json<MessageResponse>, ApiError> {
    let from_body = if body.is_empty() {
        None
    } else {
        serde_json::from_slice::<LocationParams>(&body)
            .map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {e}")))?
            .location
    };
    let location = params
        .location
        .or(from_body)
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .ok_or_else(|| ApiError::BadRequest("location is required".to_string()))?;

    match &state.chatbot {
        Some(bot) => bot.update_location(&location).await,
        None => {
            state.location.set(location.clone()).await;
            info!(location = %location, "location updated");
        }
    }

    Ok(Json(MessageResponse {
        message: format!("Location set to {location}"),
    }))
}

/// POST /clear-memory/
pub async fn clear_memory(
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    let bot = chatbot(&state)?;
    bot.clear_memory().await;
    Ok(Json(MessageResponse {
        message: "Memory cleared successfully".to_string(),
    }))
}

async fn classifier_healthy(model: &Arc<dyn ClassifierAdapter>) -> bool {
    match model.health_check().await {
        Ok(HealthStatus::Healthy) => true,
        Ok(status) => {
            warn!(model = model.name(), status = status.label(), "classifier not healthy");
            false
        }
        Err(e) => {
            warn!(model = model.name(), error = %e, "classifier health check failed");
            false
        }
    }
}

/// GET /health/
///
/// `degraded` when a loaded classifier fails its health check.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut healthy = true;
    if let Some(disease) = &state.disease {
        healthy &= classifier_healthy(disease.model()).await;
    }
    if let Some(pest) = &state.pest {
        healthy &= classifier_healthy(pest.model()).await;
    }
    Json(HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        disease_model: state.disease.is_some(),
        pest_model: state.pest.is_some(),
        chatbot: state.chatbot.is_some(),
    })
}

/// GET /models/info/
pub async fn models_info(State(state): State<AppState>) -> Json<ModelsInfo> {
    Json(state.models.as_ref().clone())
}
