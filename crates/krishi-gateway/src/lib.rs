// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for Krishi.
//!
//! Serves the disease and pest classifiers, weather lookups and the Krishi
//! Mitra chatbot over a permissive-CORS JSON API.

pub mod error;
pub mod handlers;
pub mod server;

pub use error::{ApiError, ErrorResponse};
pub use server::{AppState, ModelsInfo, router, start_server};
