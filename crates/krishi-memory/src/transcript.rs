// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::VecDeque;

use crate::types::{ChatMessage, ConversationTurn};

/// Ordered log of recent turns.
///
/// With a non-zero window the oldest turn is dropped once the window is full.
#[derive(Debug, Clone, Default)]
pub struct ConversationBuffer {
    turns: VecDeque<ConversationTurn>,
    window: usize,
}

impl ConversationBuffer {
    /// `window == 0` keeps every turn.
    pub fn new(window: usize) -> Self {
        Self {
            turns: VecDeque::new(),
            window,
        }
    }

    pub fn push(&mut self, turn: ConversationTurn) {
        if self.window > 0 && self.turns.len() == self.window {
            self.turns.pop_front();
        }
        self.turns.push_back(turn);
    }

    /// Transcript as alternating human and AI messages, oldest first.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.turns.iter().flat_map(|t| t.messages()).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.turns.iter().any(|t| t.id == id)
    }

    pub fn turns(&self) -> impl Iterator<Item = &ConversationTurn> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}
