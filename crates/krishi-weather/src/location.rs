// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use tokio::sync::RwLock;

/// The current location, shared between the weather endpoint and the chatbot.
///
/// Writes replace the whole value, so concurrent setters leave exactly one
/// of the written strings.
#[derive(Debug, Clone)]
pub struct SharedLocation(Arc<RwLock<String>>);

impl SharedLocation {
    pub fn new(initial: impl Into<String>) -> Self {
        Self(Arc::new(RwLock::new(initial.into())))
    }

    pub async fn get(&self) -> String {
        self.0.read().await.clone()
    }

    pub async fn set(&self, location: impl Into<String>) {
        *self.0.write().await = location.into();
    }
}
