//! Candidate retrieval
//!
//! Thin delegate over the vector index's nearest-neighbor query. The pool
//! is over-fetched relative to the final result size so the MMR step has
//! room to trade relevance for diversity.

use std::collections::HashSet;

use plateful_core::Result;
use tracing::debug;

use crate::index::VectorIndex;
use crate::types::Candidate;

pub struct RetrieveCandidates;

impl RetrieveCandidates {
    /// Fetch the `fetch_k` recipes nearest to `query`, excluding any id
    /// in `exclude`. The index returning fewer than `fetch_k` results is
    /// accepted as-is.
    pub async fn execute(
        index: &dyn VectorIndex,
        query: &[f32],
        fetch_k: usize,
        exclude: &HashSet<i64>,
    ) -> Result<Vec<Candidate>> {
        let candidates = index.nearest(query, fetch_k, exclude).await?;

        debug!(
            requested = fetch_k,
            returned = candidates.len(),
            excluded = exclude.len(),
            "Retrieved candidate pool"
        );

        Ok(candidates)
    }
}
