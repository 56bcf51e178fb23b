//! Plateful Recommendation Service
//!
//! Builds a per-user taste embedding from interaction history, retrieves
//! nearest-neighbor recipe candidates from a vector index, and re-ranks
//! them with Maximal Marginal Relevance to balance relevance against
//! diversity.

pub mod config;
pub mod embedding;
pub mod index;
pub mod interactions;
pub mod mmr;
pub mod preference;
pub mod recommender;
pub mod retrieval;
pub mod server;
pub mod types;

// Re-export key types
pub use config::RecsysConfig;
pub use embedding::EmbeddingClient;
pub use index::{QdrantRecipeIndex, VectorIndex};
pub use interactions::{InteractionSnapshot, InteractionStore, PostgresInteractionStore};
pub use mmr::ApplyMmrSelection;
pub use preference::BuildPreferenceVector;
pub use recommender::RecommendationService;
pub use retrieval::RetrieveCandidates;
pub use types::*;
