//! Recommendation Orchestrator
//!
//! Sequences the preference builder, candidate retriever and MMR selector
//! into the one read operation this service exposes, and hosts the thin
//! write pass-throughs (feedback, impressions, index maintenance).

use std::sync::Arc;

use plateful_core::validation::{
    validate_fetch_k, validate_lambda, validate_limit, validate_recipe_id, validate_user_id,
};
use plateful_core::{PlatefulError, Result};
use tracing::debug;

use crate::index::VectorIndex;
use crate::interactions::{InteractionSnapshot, InteractionStore};
use crate::mmr::ApplyMmrSelection;
use crate::preference::BuildPreferenceVector;
use crate::retrieval::RetrieveCandidates;
use crate::types::{FeedbackKind, RecipePayload, RecommendationRequest, RecommendedRecipe};

/// Personalized recipe recommendations over injected collaborators
pub struct RecommendationService {
    interactions: Arc<dyn InteractionStore>,
    index: Arc<dyn VectorIndex>,
    dimension: usize,
}

impl RecommendationService {
    pub fn new(
        interactions: Arc<dyn InteractionStore>,
        index: Arc<dyn VectorIndex>,
        dimension: usize,
    ) -> Self {
        Self {
            interactions,
            index,
            dimension,
        }
    }

    /// Generate personalized recommendations
    ///
    /// Steps:
    /// 1. Validate parameters (fail fast, before any I/O)
    /// 2. Load the user's interaction history
    /// 3. Build the preference vector; no signal means an empty result
    /// 4. Retrieve the over-fetched candidate pool, minus excluded ids
    /// 5. Re-rank with MMR and truncate to the requested limit
    pub async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Vec<RecommendedRecipe>> {
        validate_user_id(request.user_id)?;
        validate_limit(request.limit)?;
        validate_fetch_k(request.fetch_k, request.limit)?;
        validate_lambda(request.lambda_mult)?;

        let snapshot = InteractionSnapshot::load(self.interactions.as_ref(), request.user_id).await?;

        let Some(preference) =
            BuildPreferenceVector::execute(&snapshot, self.index.as_ref(), self.dimension).await?
        else {
            debug!(
                user_id = request.user_id,
                "No interaction signal, returning empty recommendations"
            );
            return Ok(Vec::new());
        };

        let exclude = snapshot.exclusion_set(request.exclude_seen);

        let candidates =
            RetrieveCandidates::execute(self.index.as_ref(), &preference, request.fetch_k, &exclude)
                .await?;
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let candidate_ids: Vec<i64> = candidates.iter().map(|c| c.recipe_id).collect();
        let candidate_embeddings = self.index.get_embeddings(&candidate_ids).await?;

        let selected = ApplyMmrSelection::execute(
            candidates,
            &candidate_embeddings,
            request.limit,
            request.lambda_mult,
        );

        debug!(
            user_id = request.user_id,
            selected = selected.len(),
            "Generated recommendations"
        );

        Ok(selected
            .into_iter()
            .map(|c| RecommendedRecipe {
                recipe_id: c.recipe_id,
                score: c.score,
            })
            .collect())
    }

    /// Record a like or dislike
    pub async fn record_feedback(
        &self,
        user_id: i64,
        recipe_id: i64,
        kind: FeedbackKind,
    ) -> Result<()> {
        validate_user_id(user_id)?;
        validate_recipe_id(recipe_id)?;

        self.interactions.add_feedback(user_id, recipe_id, kind).await
    }

    /// Withdraw previously given feedback
    pub async fn remove_feedback(&self, user_id: i64, recipe_id: i64) -> Result<()> {
        validate_user_id(user_id)?;
        validate_recipe_id(recipe_id)?;

        self.interactions.remove_feedback(user_id, recipe_id).await
    }

    /// Record that a recipe was shown to a user
    pub async fn record_impression(
        &self,
        user_id: i64,
        recipe_id: i64,
        source: &str,
        is_detail: bool,
    ) -> Result<()> {
        validate_user_id(user_id)?;
        validate_recipe_id(recipe_id)?;

        self.interactions
            .add_impression(user_id, recipe_id, source, is_detail)
            .await
    }

    /// Insert or replace a recipe's point in the vector index
    pub async fn upsert_recipe(
        &self,
        recipe_id: i64,
        vector: Vec<f32>,
        payload: RecipePayload,
    ) -> Result<()> {
        validate_recipe_id(recipe_id)?;

        if vector.len() != self.dimension {
            return Err(PlatefulError::validation_field(
                format!(
                    "embedding dimension mismatch: expected {}, got {}",
                    self.dimension,
                    vector.len()
                ),
                "vector",
            ));
        }

        self.index.upsert(recipe_id, vector, payload).await
    }

    /// Remove a recipe's point from the vector index
    pub async fn remove_recipe(&self, recipe_id: i64) -> Result<()> {
        validate_recipe_id(recipe_id)?;

        self.index.delete(recipe_id).await
    }

    /// Number of recipes currently indexed
    pub async fn indexed_recipe_count(&self) -> Result<usize> {
        Ok(self.index.list_ids().await?.len())
    }
}
