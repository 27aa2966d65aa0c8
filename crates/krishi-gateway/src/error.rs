// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request-level errors and their HTTP mapping.

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug)]
pub enum ApiError {
    /// The chatbot failed to initialise at startup.
    ChatbotUnavailable,
    /// The named classifier was not loaded at startup.
    ModelUnavailable(&'static str),
    /// Reading the multipart upload failed, with the extractor's status
    /// (413 for oversized bodies).
    Upload { status: StatusCode, message: String },
    BadRequest(String),
    NotFound(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::ChatbotUnavailable | ApiError::ModelUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::Upload { status, .. } => *status,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::ChatbotUnavailable => "chatbot is not available".to_string(),
            ApiError::ModelUnavailable(name) => format!("{name} model is not loaded"),
            ApiError::Upload { message, .. }
            | ApiError::BadRequest(message)
            | ApiError::NotFound(message) => message.clone(),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        ApiError::Upload {
            status: e.status(),
            message: format!("invalid upload: {}", e.body_text()),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(e: QueryRejection) -> Self {
        ApiError::BadRequest(e.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ErrorResponse {
                error: self.message(),
            }),
        )
            .into_response()
    }
}
