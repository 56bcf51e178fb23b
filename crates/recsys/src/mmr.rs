//! Diversity Selection using Maximal Marginal Relevance (MMR)
//!
//! Greedily picks a top-`limit` subset of the candidate pool, trading off
//! a candidate's relevance against its similarity to what has already
//! been picked.
//!
//! MMR formula: score = λ * relevance - (1-λ) * max_similarity_to_selected
//!
//! Relevance is the raw retriever score (a cosine similarity, higher is
//! better). λ = 1.0 reduces to pure relevance ranking, λ = 0.0 to pure
//! diversity.

use std::collections::HashMap;

use plateful_core::math::cosine_similarity;

use crate::types::Candidate;

/// Apply greedy MMR selection over a pre-ranked candidate pool
pub struct ApplyMmrSelection;

impl ApplyMmrSelection {
    /// Select up to `limit` candidates in MMR order.
    ///
    /// A pool no larger than `limit` is returned unchanged. The first
    /// selection is always the best-ranked candidate; each subsequent
    /// pick maximizes the MMR score among candidates with a known
    /// embedding. Selection stops early once no remaining candidate has
    /// an embedding.
    pub fn execute(
        candidates: Vec<Candidate>,
        embeddings: &HashMap<i64, Vec<f32>>,
        limit: usize,
        lambda_mult: f32,
    ) -> Vec<Candidate> {
        if candidates.len() <= limit {
            return candidates;
        }
        if limit == 0 {
            return Vec::new();
        }

        let mut remaining = candidates;
        let mut selected: Vec<Candidate> = Vec::with_capacity(limit);

        // Seed with the best-ranked candidate; the retriever pre-sorts
        // by descending relevance.
        selected.push(remaining.remove(0));

        while selected.len() < limit && !remaining.is_empty() {
            let mut best_score = f32::NEG_INFINITY;
            let mut best_index: Option<usize> = None;

            for (index, candidate) in remaining.iter().enumerate() {
                let Some(candidate_embedding) = embeddings.get(&candidate.recipe_id) else {
                    continue;
                };

                let relevance = candidate.score;

                let mut max_similarity: f32 = 0.0;
                for picked in &selected {
                    if let Some(picked_embedding) = embeddings.get(&picked.recipe_id) {
                        let sim = cosine_similarity(candidate_embedding, picked_embedding);
                        max_similarity = max_similarity.max(sim);
                    }
                }

                let mmr_score = lambda_mult * relevance - (1.0 - lambda_mult) * max_similarity;

                if mmr_score > best_score {
                    best_score = mmr_score;
                    best_index = Some(index);
                }
            }

            match best_index {
                Some(index) => selected.push(remaining.remove(index)),
                None => break,
            }
        }

        selected
    }
}
