//! Core types for the recommendation service

use serde::{Deserialize, Serialize};

/// Request-scoped user taste embedding. L2-normalized whenever present.
pub type PreferenceVector = Vec<f32>;

/// Explicit feedback a user can leave on a recipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackKind {
    Like,
    Dislike,
}

impl FeedbackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackKind::Like => "like",
            FeedbackKind::Dislike => "dislike",
        }
    }
}

/// Metadata stored alongside a recipe vector in the index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipePayload {
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A nearest-neighbor hit from the vector index, pre-sorted by the index
/// with the most relevant candidate first.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub recipe_id: i64,
    pub score: f32,
    pub payload: Option<RecipePayload>,
}

/// One row of the final ranked result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedRecipe {
    pub recipe_id: i64,
    pub score: f32,
}

/// Parameters of a recommendation request
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationRequest {
    pub user_id: i64,

    /// Number of recipes to return
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Candidate pool size requested from the index before re-ranking
    #[serde(default = "default_fetch_k")]
    pub fetch_k: usize,

    /// Relevance vs diversity trade-off: 1.0 = pure relevance,
    /// 0.0 = pure diversity
    #[serde(default = "default_lambda")]
    pub lambda_mult: f32,

    /// Also exclude recipes the user has viewed. Liked, disliked and
    /// authored recipes are excluded regardless of this flag.
    #[serde(default = "default_exclude_seen")]
    pub exclude_seen: bool,
}

impl RecommendationRequest {
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            limit: default_limit(),
            fetch_k: default_fetch_k(),
            lambda_mult: default_lambda(),
            exclude_seen: default_exclude_seen(),
        }
    }
}

fn default_limit() -> usize {
    10
}

fn default_fetch_k() -> usize {
    20
}

fn default_lambda() -> f32 {
    0.5
}

fn default_exclude_seen() -> bool {
    true
}
