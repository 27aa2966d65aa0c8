// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory similarity index over past turns with MMR retrieval.

use std::cmp::Ordering;

use crate::types::{ConversationTurn, cosine_similarity};

/// Parameters for maximal marginal relevance retrieval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MmrParams {
    /// Results returned.
    pub k: usize,
    /// Nearest candidates considered before re-ranking.
    pub fetch_k: usize,
    /// 1.0 ranks purely by relevance, 0.0 purely by diversity.
    pub lambda_mult: f32,
}

impl Default for MmrParams {
    fn default() -> Self {
        Self {
            k: 5,
            fetch_k: 10,
            lambda_mult: 0.7,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    turn: ConversationTurn,
    embedding: Vec<f32>,
}

/// Stores each turn with its embedding.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    entries: Vec<Entry>,
}

impl VectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, turn: ConversationTurn, embedding: Vec<f32>) {
        self.entries.push(Entry { turn, embedding });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// The `fetch_k` nearest turns re-ranked down to `k` with MMR.
    pub fn search_mmr(&self, query: &[f32], params: MmrParams) -> Vec<ConversationTurn> {
        let mut nearest: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (i, cosine_similarity(query, &e.embedding)))
            .collect();
        nearest.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        nearest.truncate(params.fetch_k.max(params.k));

        let candidates: Vec<&[f32]> = nearest
            .iter()
            .map(|(i, _)| self.entries[*i].embedding.as_slice())
            .collect();

        mmr_select(query, &candidates, params.k, params.lambda_mult)
            .into_iter()
            .map(|c| self.entries[nearest[c].0].turn.clone())
            .collect()
    }
}

/// Picks up to `k` candidate indices by maximal marginal relevance.
///
/// Each step chooses the candidate maximising
/// `lambda * sim(query, d) - (1 - lambda) * max(sim(d, s) for s in selected)`.
/// Ties keep the earlier candidate.
pub fn mmr_select(query: &[f32], candidates: &[&[f32]], k: usize, lambda: f32) -> Vec<usize> {
    let relevance: Vec<f32> = candidates
        .iter()
        .map(|c| cosine_similarity(query, c))
        .collect();

    let mut selected: Vec<usize> = Vec::with_capacity(k.min(candidates.len()));
    let mut remaining: Vec<usize> = (0..candidates.len()).collect();

    while selected.len() < k && !remaining.is_empty() {
        let mut best_pos = 0;
        let mut best_score = f32::NEG_INFINITY;
        for (pos, &idx) in remaining.iter().enumerate() {
            let redundancy = selected
                .iter()
                .map(|&s| cosine_similarity(candidates[idx], candidates[s]))
                .fold(f32::NEG_INFINITY, f32::max);
            let redundancy = if selected.is_empty() { 0.0 } else { redundancy };
            let score = lambda * relevance[idx] - (1.0 - lambda) * redundancy;
            if score > best_score {
                best_score = score;
                best_pos = pos;
            }
        }
        selected.push(remaining.remove(best_pos));
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lambda_one_is_relevance_order() {
        let query = [1.0, 0.0];
        let a = [0.9, 0.1];
        let b = [0.99, 0.01];
        let c = [0.0, 1.0];
        let picked = mmr_select(&query, &[&a, &b, &c], 3, 1.0);
        assert_eq!(picked, vec![1, 0, 2]);
    }

    #[test]
    fn low_lambda_prefers_diversity() {
        let query = [1.0, 0.2];
        let near = [1.0, 0.21];
        let near_dup = [1.0, 0.22];
        let other = [0.2, 1.0];

        let relevance_only = mmr_select(&query, &[&near, &near_dup, &other], 2, 1.0);
        assert_eq!(relevance_only, vec![0, 1]);

        let diverse = mmr_select(&query, &[&near, &near_dup, &other], 2, 0.3);
        assert_eq!(diverse, vec![0, 2]);
    }

    #[test]
    fn k_larger_than_candidates() {
        let query = [1.0];
        let a = [1.0];
        assert_eq!(mmr_select(&query, &[&a], 5, 0.7), vec![0]);
        assert!(mmr_select(&query, &[], 5, 0.7).is_empty());
    }

    #[test]
    fn search_limits_to_k_and_fetch_k() {
        let mut index = VectorIndex::new();
        for i in 0..20 {
            let angle = i as f32 * 0.05;
            index.add(
                ConversationTurn::new(format!("q{i}"), "a"),
                vec![angle.cos(), angle.sin()],
            );
        }
        let params = MmrParams {
            k: 3,
            fetch_k: 6,
            lambda_mult: 1.0,
        };
        let hits = index.search_mmr(&[1.0, 0.0], params);
        let inputs: Vec<_> = hits.iter().map(|t| t.input.as_str()).collect();
        assert_eq!(inputs, vec!["q0", "q1", "q2"]);
    }

    #[test]
    fn empty_index_returns_nothing() {
        let index = VectorIndex::new();
        assert!(index.search_mmr(&[1.0, 0.0], MmrParams::default()).is_empty());
    }
}
