//! User Preference Embedding
//!
//! Builds a single taste vector for a user out of the embeddings of the
//! recipes they interacted with. Explicit feedback dominates; dislikes
//! push away; plain and detail views nudge gently.

use std::collections::{HashMap, HashSet};

use ndarray::Array1;
use plateful_core::{math, Result};

use crate::index::VectorIndex;
use crate::interactions::InteractionSnapshot;
use crate::types::PreferenceVector;

/// Weight of the liked-recipes component
pub const LIKE_WEIGHT: f32 = 2.0;
/// Weight of the disliked-recipes component
pub const DISLIKE_WEIGHT: f32 = -1.0;
/// Weight of the viewed-recipes component
pub const VIEW_WEIGHT: f32 = 0.2;
/// Weight of the detail-viewed-recipes component
pub const DETAIL_VIEW_WEIGHT: f32 = 0.2;

/// Build a user preference vector from interaction history
///
/// Steps:
/// 1. Batch-fetch embeddings for every recipe referenced by the user's
///    likes, dislikes, views and detail views (recipes missing from the
///    index are silently skipped).
/// 2. Per interaction kind, average the individually L2-normalized
///    embeddings into a component vector.
/// 3. Combine the components with fixed weights; absent components
///    contribute nothing.
/// 4. L2-normalize the combined vector. A user with no usable signal
///    yields `None`.
pub struct BuildPreferenceVector;

impl BuildPreferenceVector {
    pub async fn execute(
        snapshot: &InteractionSnapshot,
        index: &dyn VectorIndex,
        dim: usize,
    ) -> Result<Option<PreferenceVector>> {
        let mut referenced: HashSet<i64> = HashSet::new();
        referenced.extend(&snapshot.liked);
        referenced.extend(&snapshot.disliked);
        referenced.extend(&snapshot.viewed);
        referenced.extend(&snapshot.detail_viewed);

        if referenced.is_empty() {
            return Ok(None);
        }

        let ids: Vec<i64> = referenced.into_iter().collect();
        let embeddings = index.get_embeddings(&ids).await?;

        let components = [
            (component_mean(&snapshot.liked, &embeddings, dim), LIKE_WEIGHT),
            (
                component_mean(&snapshot.disliked, &embeddings, dim),
                DISLIKE_WEIGHT,
            ),
            (component_mean(&snapshot.viewed, &embeddings, dim), VIEW_WEIGHT),
            (
                component_mean(&snapshot.detail_viewed, &embeddings, dim),
                DETAIL_VIEW_WEIGHT,
            ),
        ];

        Ok(combine_components(components, dim))
    }
}

/// Element-wise mean of the individually normalized embeddings of `ids`.
///
/// Ids without a retrieved embedding are skipped; `None` if none remain.
fn component_mean(
    ids: &HashSet<i64>,
    embeddings: &HashMap<i64, Vec<f32>>,
    dim: usize,
) -> Option<Array1<f32>> {
    let mut sum = Array1::<f32>::zeros(dim);
    let mut count = 0usize;

    for id in ids {
        let Some(embedding) = embeddings.get(id) else {
            continue;
        };
        if embedding.len() != dim {
            continue;
        }

        let normalized = math::normalize_vector(embedding);
        sum = sum + &Array1::from_vec(normalized);
        count += 1;
    }

    if count == 0 {
        None
    } else {
        Some(sum / count as f32)
    }
}

/// Weighted sum of the present components, L2-normalized.
///
/// `None` when every component is absent or the combined norm is exactly
/// zero (opposing components cancelling out).
fn combine_components(
    components: [(Option<Array1<f32>>, f32); 4],
    dim: usize,
) -> Option<PreferenceVector> {
    let mut combined = Array1::<f32>::zeros(dim);
    let mut any_component = false;

    for (component, weight) in components {
        if let Some(component) = component {
            combined = combined + &(component * weight);
            any_component = true;
        }
    }

    if !any_component {
        return None;
    }

    let norm = combined.dot(&combined).sqrt();
    if norm == 0.0 {
        return None;
    }

    Some((combined / norm).to_vec())
}
