//! Qdrant Vector Index Integration
//!
//! Stores one point per recipe, keyed by the recipe's numeric id, in a
//! cosine-distance collection. Qdrant scores are therefore similarities:
//! higher is better, and with unit-normalized vectors they lie in [-1, 1].

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use plateful_core::{PlatefulError, Result};
use qdrant_client::qdrant::{
    point_id::PointIdOptions, points_selector::PointsSelectorOneOf, value::Kind,
    vectors::VectorsOptions, vectors_config::Config, Condition, CreateCollection, DeletePoints,
    Distance, Filter, GetPoints, ListValue, PointId, PointStruct, PointsIdsList, PointsSelector,
    ScrollPoints, SearchParams, SearchPoints, UpsertPoints, Value, VectorParams, VectorsConfig,
};
use qdrant_client::{Payload, Qdrant};
use tracing::{debug, info};

use crate::types::{Candidate, RecipePayload};

/// Page size for id enumeration scrolls
const SCROLL_PAGE: u32 = 1000;

/// Nearest-neighbor access to the recipe embedding space
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Ranked nearest neighbors to `query`, best first, with any id in
    /// `exclude` filtered out. May return fewer than `k` results.
    async fn nearest(
        &self,
        query: &[f32],
        k: usize,
        exclude: &HashSet<i64>,
    ) -> Result<Vec<Candidate>>;

    /// Batched vector retrieval. Ids with no stored point are simply
    /// absent from the returned map.
    async fn get_embeddings(&self, ids: &[i64]) -> Result<HashMap<i64, Vec<f32>>>;

    /// Every recipe id currently present in the index.
    async fn list_ids(&self) -> Result<Vec<i64>>;

    async fn upsert(&self, recipe_id: i64, vector: Vec<f32>, payload: RecipePayload) -> Result<()>;

    async fn delete(&self, recipe_id: i64) -> Result<()>;
}

/// Qdrant-backed recipe index
pub struct QdrantRecipeIndex {
    client: Qdrant,
    collection_name: String,
    dimension: usize,
    ef_search: usize,
}

impl QdrantRecipeIndex {
    pub fn new(url: &str, collection_name: String, dimension: usize, ef_search: usize) -> Result<Self> {
        let client = Qdrant::from_url(url).build().map_err(|e| {
            PlatefulError::ConfigurationError {
                message: format!("Failed to create Qdrant client: {}", e),
                key: Some("RECSYS_VECTOR_QDRANT_URL".to_string()),
            }
        })?;

        info!("Connected to Qdrant at {}", url);

        Ok(Self {
            client,
            collection_name,
            dimension,
            ef_search,
        })
    }

    /// Create the recipe collection if it does not exist yet.
    pub async fn ensure_collection(&self) -> Result<()> {
        let collections = self
            .client
            .list_collections()
            .await
            .map_err(|e| PlatefulError::VectorIndexError(format!("Failed to list collections: {}", e)))?;

        let collection_exists = collections
            .collections
            .iter()
            .any(|c| c.name == self.collection_name);

        if collection_exists {
            debug!("Collection '{}' already exists", self.collection_name);
            return Ok(());
        }

        info!(
            "Creating collection '{}' with vector size {}",
            self.collection_name, self.dimension
        );

        self.client
            .create_collection(CreateCollection {
                collection_name: self.collection_name.clone(),
                vectors_config: Some(VectorsConfig {
                    config: Some(Config::Params(VectorParams {
                        size: self.dimension as u64,
                        distance: Distance::Cosine.into(),
                        ..Default::default()
                    })),
                }),
                ..Default::default()
            })
            .await
            .map_err(|e| PlatefulError::VectorIndexError(format!("Failed to create collection: {}", e)))?;

        Ok(())
    }

    fn payload_map(recipe_id: i64, payload: RecipePayload) -> HashMap<String, Value> {
        let mut map = HashMap::new();

        map.insert("recipe_id".to_string(), Value::from(recipe_id));
        map.insert("title".to_string(), Value::from(payload.title));

        let tag_values: Vec<Value> = payload.tags.into_iter().map(Value::from).collect();
        map.insert(
            "tags".to_string(),
            Value {
                kind: Some(Kind::ListValue(ListValue { values: tag_values })),
            },
        );

        map
    }

    fn parse_payload(payload: &HashMap<String, Value>) -> Option<RecipePayload> {
        let title = payload.get("title")?.as_str()?.to_string();
        let tags = payload
            .get("tags")
            .and_then(|v| v.as_list())
            .map(|list| {
                list.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();

        Some(RecipePayload { title, tags })
    }
}

fn recipe_point_id(recipe_id: i64) -> PointId {
    PointId::from(recipe_id as u64)
}

fn point_id_to_recipe_id(id: &PointId) -> Option<i64> {
    match id.point_id_options {
        Some(PointIdOptions::Num(n)) => Some(n as i64),
        _ => None,
    }
}

#[async_trait]
impl VectorIndex for QdrantRecipeIndex {
    async fn nearest(
        &self,
        query: &[f32],
        k: usize,
        exclude: &HashSet<i64>,
    ) -> Result<Vec<Candidate>> {
        let filter = if exclude.is_empty() {
            None
        } else {
            Some(Filter {
                must_not: vec![Condition::has_id(
                    exclude.iter().map(|&id| recipe_point_id(id)),
                )],
                ..Default::default()
            })
        };

        let search_result = self
            .client
            .search_points(SearchPoints {
                collection_name: self.collection_name.clone(),
                vector: query.to_vec(),
                filter,
                limit: k as u64,
                with_payload: Some(true.into()),
                params: Some(SearchParams {
                    hnsw_ef: Some(self.ef_search as u64),
                    exact: Some(false),
                    ..Default::default()
                }),
                ..Default::default()
            })
            .await
            .map_err(|e| PlatefulError::VectorIndexError(format!("Search failed: {}", e)))?;

        let candidates: Vec<Candidate> = search_result
            .result
            .into_iter()
            .filter_map(|point| {
                let recipe_id = point.id.as_ref().and_then(point_id_to_recipe_id)?;
                Some(Candidate {
                    recipe_id,
                    score: point.score,
                    payload: Self::parse_payload(&point.payload),
                })
            })
            .collect();

        debug!("Found {} candidate vectors", candidates.len());
        Ok(candidates)
    }

    async fn get_embeddings(&self, ids: &[i64]) -> Result<HashMap<i64, Vec<f32>>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let point_ids: Vec<PointId> = ids.iter().map(|&id| recipe_point_id(id)).collect();

        let response = self
            .client
            .get_points(GetPoints {
                collection_name: self.collection_name.clone(),
                ids: point_ids,
                with_payload: Some(false.into()),
                with_vectors: Some(true.into()),
                ..Default::default()
            })
            .await
            .map_err(|e| PlatefulError::VectorIndexError(format!("Point retrieval failed: {}", e)))?;

        let mut embeddings = HashMap::new();
        for point in response.result {
            let Some(recipe_id) = point.id.as_ref().and_then(point_id_to_recipe_id) else {
                continue;
            };
            let Some(VectorsOptions::Vector(vector)) =
                point.vectors.and_then(|v| v.vectors_options)
            else {
                continue;
            };
            embeddings.insert(recipe_id, vector.data);
        }

        debug!("Retrieved {} of {} requested embeddings", embeddings.len(), ids.len());
        Ok(embeddings)
    }

    async fn list_ids(&self) -> Result<Vec<i64>> {
        let mut ids = Vec::new();
        let mut offset: Option<PointId> = None;

        loop {
            let response = self
                .client
                .scroll(ScrollPoints {
                    collection_name: self.collection_name.clone(),
                    limit: Some(SCROLL_PAGE),
                    offset: offset.clone(),
                    with_payload: Some(false.into()),
                    with_vectors: Some(false.into()),
                    ..Default::default()
                })
                .await
                .map_err(|e| PlatefulError::VectorIndexError(format!("Scroll failed: {}", e)))?;

            ids.extend(
                response
                    .result
                    .iter()
                    .filter_map(|point| point.id.as_ref().and_then(point_id_to_recipe_id)),
            );

            match response.next_page_offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        Ok(ids)
    }

    async fn upsert(&self, recipe_id: i64, vector: Vec<f32>, payload: RecipePayload) -> Result<()> {
        let payload: Payload = Self::payload_map(recipe_id, payload).into();
        let point = PointStruct::new(recipe_id as u64, vector, payload);

        self.client
            .upsert_points(UpsertPoints {
                collection_name: self.collection_name.clone(),
                wait: Some(true),
                points: vec![point],
                ..Default::default()
            })
            .await
            .map_err(|e| PlatefulError::VectorIndexError(format!("Failed to upsert point: {}", e)))?;

        debug!("Upserted recipe {} into '{}'", recipe_id, self.collection_name);
        Ok(())
    }

    async fn delete(&self, recipe_id: i64) -> Result<()> {
        self.client
            .delete_points(DeletePoints {
                collection_name: self.collection_name.clone(),
                wait: Some(true),
                points: Some(PointsSelector {
                    points_selector_one_of: Some(PointsSelectorOneOf::Points(PointsIdsList {
                        ids: vec![recipe_point_id(recipe_id)],
                    })),
                }),
                ..Default::default()
            })
            .await
            .map_err(|e| PlatefulError::VectorIndexError(format!("Failed to delete point: {}", e)))?;

        debug!("Deleted recipe {} from '{}'", recipe_id, self.collection_name);
        Ok(())
    }
}
