// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation memory types.

use serde::{Deserialize, Serialize};

/// One query/answer exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub id: String,
    pub input: String,
    pub output: String,
    /// RFC 3339 UTC timestamp.
    pub timestamp: String,
}

impl ConversationTurn {
    /// New turn stamped with a fresh id and the current time.
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            input: input.into(),
            output: output.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Text that is embedded into the similarity index.
    pub fn document(&self) -> String {
        format!("input: {}\noutput: {}", self.input, self.output)
    }

    /// The turn as a human message followed by an AI message.
    pub fn messages(&self) -> [ChatMessage; 2] {
        [
            ChatMessage {
                role: MessageRole::Human,
                content: self.input.clone(),
            },
            ChatMessage {
                role: MessageRole::Ai,
                content: self.output.clone(),
            },
        ]
    }
}

/// Speaker of a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    Human,
    Ai,
}

impl MessageRole {
    /// Upper-case label used when formatting history.
    pub fn label(self) -> &'static str {
        match self {
            MessageRole::Human => "HUMAN",
            MessageRole::Ai => "AI",
        }
    }
}

/// A single transcript message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

/// Everything memory knows that is relevant to one query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryContext {
    /// Transcript messages, oldest first.
    pub messages: Vec<ChatMessage>,
    /// Turns picked by MMR retrieval that are no longer in the transcript.
    pub relevant: Vec<ConversationTurn>,
}

impl MemoryContext {
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.relevant.is_empty()
    }
}

/// Cosine similarity of two vectors.
///
/// Returns 0.0 when either vector has zero magnitude or lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom > f32::EPSILON { dot / denom } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_format() {
        let turn = ConversationTurn::new("When to sow wheat?", "<p>November.</p>");
        assert_eq!(turn.document(), "input: When to sow wheat?\noutput: <p>November.</p>");
        assert!(chrono::DateTime::parse_from_rfc3339(&turn.timestamp).is_ok());
    }

    #[test]
    fn messages_are_human_then_ai() {
        let turn = ConversationTurn::new("q", "a");
        let [h, a] = turn.messages();
        assert_eq!(h.role.label(), "HUMAN");
        assert_eq!(a.role.label(), "AI");
        assert_eq!(a.content, "a");
    }

    #[test]
    fn cosine_identical_and_orthogonal() {
        assert!((cosine_similarity(&[1.0, 2.0], &[2.0, 4.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }
}
