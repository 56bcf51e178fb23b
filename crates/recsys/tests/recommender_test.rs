//! End-to-end recommendation flow tests over in-memory collaborators

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use plateful_core::math::{cosine_similarity, l2_norm};
use plateful_core::{PlatefulError, Result};
use plateful_recsys::index::VectorIndex;
use plateful_recsys::interactions::{InteractionSnapshot, InteractionStore};
use plateful_recsys::preference::BuildPreferenceVector;
use plateful_recsys::recommender::RecommendationService;
use plateful_recsys::types::{Candidate, FeedbackKind, RecipePayload, RecommendationRequest};

#[derive(Default)]
struct FakeInteractionStore {
    liked: HashSet<i64>,
    disliked: HashSet<i64>,
    viewed: HashSet<i64>,
    detail_viewed: HashSet<i64>,
    authored: HashSet<i64>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

#[async_trait]
impl InteractionStore for FakeInteractionStore {
    async fn liked_recipe_ids(&self, _user_id: i64) -> Result<HashSet<i64>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.liked.clone())
    }

    async fn disliked_recipe_ids(&self, _user_id: i64) -> Result<HashSet<i64>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.disliked.clone())
    }

    async fn viewed_recipe_ids(&self, _user_id: i64) -> Result<HashSet<i64>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.viewed.clone())
    }

    async fn detail_viewed_recipe_ids(&self, _user_id: i64) -> Result<HashSet<i64>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.detail_viewed.clone())
    }

    async fn authored_recipe_ids(&self, _user_id: i64) -> Result<HashSet<i64>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.authored.clone())
    }

    async fn add_feedback(&self, _user_id: i64, _recipe_id: i64, _kind: FeedbackKind) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn remove_feedback(&self, _user_id: i64, _recipe_id: i64) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn add_impression(
        &self,
        _user_id: i64,
        _recipe_id: i64,
        _source: &str,
        _is_detail: bool,
    ) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
struct FakeVectorIndex {
    points: BTreeMap<i64, Vec<f32>>,
    /// Ids whose vectors cannot be retrieved, to simulate partial data.
    hidden: HashSet<i64>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

#[async_trait]
impl VectorIndex for FakeVectorIndex {
    async fn nearest(
        &self,
        query: &[f32],
        k: usize,
        exclude: &HashSet<i64>,
    ) -> Result<Vec<Candidate>> {
        self.reads.fetch_add(1, Ordering::SeqCst);

        let mut scored: Vec<Candidate> = self
            .points
            .iter()
            .filter(|(id, _)| !exclude.contains(id))
            .map(|(&recipe_id, vector)| Candidate {
                recipe_id,
                score: cosine_similarity(query, vector),
                payload: None,
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
        scored.truncate(k);
        Ok(scored)
    }

    async fn get_embeddings(&self, ids: &[i64]) -> Result<HashMap<i64, Vec<f32>>> {
        self.reads.fetch_add(1, Ordering::SeqCst);

        Ok(ids
            .iter()
            .filter(|id| !self.hidden.contains(id))
            .filter_map(|id| self.points.get(id).map(|v| (*id, v.clone())))
            .collect())
    }

    async fn list_ids(&self) -> Result<Vec<i64>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.points.keys().copied().collect())
    }

    async fn upsert(&self, _recipe_id: i64, _vector: Vec<f32>, _payload: RecipePayload) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete(&self, _recipe_id: i64) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

const DIM: usize = 3;

fn make_service(
    store: Arc<FakeInteractionStore>,
    index: Arc<FakeVectorIndex>,
) -> RecommendationService {
    RecommendationService::new(store, index, DIM)
}

/// Unit vector in the x-y plane whose similarity to [1, 0, 0] is `c`.
fn planar_vector(c: f32) -> Vec<f32> {
    vec![c, (1.0 - c * c).sqrt(), 0.0]
}

#[tokio::test]
async fn test_invalid_inputs_rejected_before_any_collaborator_call() {
    let store = Arc::new(FakeInteractionStore::default());
    let index = Arc::new(FakeVectorIndex::default());
    let service = make_service(store.clone(), index.clone());

    let bad_user = RecommendationRequest::new(-1);
    let mut bad_limit = RecommendationRequest::new(1);
    bad_limit.limit = 0;
    let mut bad_fetch_k = RecommendationRequest::new(1);
    bad_fetch_k.fetch_k = 5;
    let mut bad_lambda = RecommendationRequest::new(1);
    bad_lambda.lambda_mult = 1.5;

    for request in [&bad_user, &bad_limit, &bad_fetch_k, &bad_lambda] {
        let result = service.recommend(request).await;
        assert!(matches!(
            result,
            Err(PlatefulError::ValidationError { .. })
        ));
    }

    assert_eq!(store.reads.load(Ordering::SeqCst), 0);
    assert_eq!(index.reads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_user_without_signal_gets_empty_result() {
    let store = Arc::new(FakeInteractionStore::default());
    let index = Arc::new(FakeVectorIndex {
        points: BTreeMap::from([(1, vec![1.0, 0.0, 0.0])]),
        ..Default::default()
    });
    let service = make_service(store, index.clone());

    let result = service.recommend(&RecommendationRequest::new(1)).await.unwrap();

    assert!(result.is_empty());
    // With no referenced recipes the index is never consulted.
    assert_eq!(index.reads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_single_like_yields_that_embedding_as_preference() {
    let index = FakeVectorIndex {
        points: BTreeMap::from([(5, vec![1.0, 0.0, 0.0])]),
        ..Default::default()
    };
    let snapshot = InteractionSnapshot {
        liked: [5].into_iter().collect(),
        ..Default::default()
    };

    let preference = BuildPreferenceVector::execute(&snapshot, &index, DIM)
        .await
        .unwrap()
        .unwrap();

    assert!((preference[0] - 1.0).abs() < 1e-6);
    assert!(preference[1].abs() < 1e-6);
    assert!(preference[2].abs() < 1e-6);
}

#[tokio::test]
async fn test_dislike_and_view_combination_arithmetic() {
    let index = FakeVectorIndex {
        points: BTreeMap::from([(7, vec![2.0, 0.0, 0.0]), (3, vec![0.0, 3.0, 0.0])]),
        ..Default::default()
    };
    let snapshot = InteractionSnapshot {
        disliked: [7].into_iter().collect(),
        viewed: [3].into_iter().collect(),
        ..Default::default()
    };

    let preference = BuildPreferenceVector::execute(&snapshot, &index, DIM)
        .await
        .unwrap()
        .unwrap();

    // normalize(-1.0 * [1,0,0] + 0.2 * [0,1,0])
    let norm = 1.04f32.sqrt();
    assert!((preference[0] - (-1.0 / norm)).abs() < 1e-6);
    assert!((preference[1] - (0.2 / norm)).abs() < 1e-6);
    assert!(preference[2].abs() < 1e-6);
}

#[tokio::test]
async fn test_preference_vector_is_unit_length() {
    let index = FakeVectorIndex {
        points: BTreeMap::from([
            (1, vec![0.3, 0.7, 0.1]),
            (2, vec![0.0, 0.2, 0.9]),
            (3, vec![0.5, 0.5, 0.5]),
            (4, vec![0.9, 0.0, 0.1]),
        ]),
        ..Default::default()
    };
    let snapshot = InteractionSnapshot {
        liked: [1, 2].into_iter().collect(),
        disliked: [3].into_iter().collect(),
        detail_viewed: [4].into_iter().collect(),
        ..Default::default()
    };

    let preference = BuildPreferenceVector::execute(&snapshot, &index, DIM)
        .await
        .unwrap()
        .unwrap();

    assert!((l2_norm(&preference) - 1.0).abs() < 1e-6);
}

#[tokio::test]
async fn test_judged_and_authored_recipes_never_resurface() {
    let mut points = BTreeMap::new();
    for i in 1..=12 {
        points.insert(i, planar_vector(1.0 - 0.05 * i as f32));
    }
    let index = Arc::new(FakeVectorIndex {
        points,
        ..Default::default()
    });
    let store = Arc::new(FakeInteractionStore {
        liked: [1].into_iter().collect(),
        disliked: [2].into_iter().collect(),
        authored: [3].into_iter().collect(),
        viewed: [4].into_iter().collect(),
        ..Default::default()
    });
    let service = make_service(store, index);

    let mut request = RecommendationRequest::new(1);
    request.limit = 5;
    request.fetch_k = 10;

    let with_seen_excluded = service.recommend(&request).await.unwrap();
    for row in &with_seen_excluded {
        assert!(![1, 2, 3, 4].contains(&row.recipe_id));
    }

    request.exclude_seen = false;
    let with_seen_allowed = service.recommend(&request).await.unwrap();
    for row in &with_seen_allowed {
        // Viewed ids may resurface, judged and authored ids may not.
        assert!(![1, 2, 3].contains(&row.recipe_id));
    }
    assert!(with_seen_allowed.iter().any(|r| r.recipe_id == 4));
}

#[tokio::test]
async fn test_result_respects_limit_and_has_no_duplicates() {
    let mut points = BTreeMap::new();
    points.insert(100, vec![1.0, 0.0, 0.0]);
    for i in 1..=30 {
        points.insert(i, planar_vector(0.98 - 0.02 * i as f32));
    }
    let index = Arc::new(FakeVectorIndex {
        points,
        ..Default::default()
    });
    let store = Arc::new(FakeInteractionStore {
        liked: [100].into_iter().collect(),
        ..Default::default()
    });
    let service = make_service(store, index);

    let mut request = RecommendationRequest::new(1);
    request.limit = 10;
    request.fetch_k = 20;

    let result = service.recommend(&request).await.unwrap();

    assert_eq!(result.len(), 10);

    let mut ids: Vec<i64> = result.iter().map(|r| r.recipe_id).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 10);
}

#[tokio::test]
async fn test_pure_relevance_returns_descending_scores() {
    let mut points = BTreeMap::new();
    points.insert(100, vec![1.0, 0.0, 0.0]);
    for i in 1..=20 {
        points.insert(i, planar_vector(0.98 - 0.02 * i as f32));
    }
    let index = Arc::new(FakeVectorIndex {
        points,
        ..Default::default()
    });
    let store = Arc::new(FakeInteractionStore {
        liked: [100].into_iter().collect(),
        ..Default::default()
    });
    let service = make_service(store, index);

    let mut request = RecommendationRequest::new(1);
    request.limit = 5;
    request.fetch_k = 15;
    request.lambda_mult = 1.0;

    let result = service.recommend(&request).await.unwrap();

    assert_eq!(result.len(), 5);
    for pair in result.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[tokio::test]
async fn test_missing_candidate_embeddings_shrink_the_result() {
    let mut points = BTreeMap::new();
    points.insert(100, vec![1.0, 0.0, 0.0]);
    for i in 1..=20 {
        points.insert(i, planar_vector(1.0 - 0.02 * i as f32));
    }
    // Vectors for ids 9..=20 cannot be retrieved after the search.
    let hidden: HashSet<i64> = (9..=20).collect();
    let index = Arc::new(FakeVectorIndex {
        points,
        hidden,
        ..Default::default()
    });
    let store = Arc::new(FakeInteractionStore {
        liked: [100].into_iter().collect(),
        ..Default::default()
    });
    let service = make_service(store, index);

    let mut request = RecommendationRequest::new(1);
    request.limit = 10;
    request.fetch_k = 20;

    let result = service.recommend(&request).await.unwrap();

    // The seed plus the seven remaining retrievable candidates.
    assert_eq!(result.len(), 8);
    for row in &result {
        assert!(row.recipe_id <= 8);
    }
}

#[tokio::test]
async fn test_all_candidates_excluded_gives_empty_result() {
    let points = BTreeMap::from([(1, vec![1.0, 0.0, 0.0]), (2, vec![0.9, 0.1, 0.0])]);
    let index = Arc::new(FakeVectorIndex {
        points,
        ..Default::default()
    });
    let store = Arc::new(FakeInteractionStore {
        liked: [1, 2].into_iter().collect(),
        ..Default::default()
    });
    let service = make_service(store, index);

    let result = service.recommend(&RecommendationRequest::new(1)).await.unwrap();

    assert!(result.is_empty());
}

#[tokio::test]
async fn test_feedback_and_impression_pass_throughs() {
    let store = Arc::new(FakeInteractionStore::default());
    let index = Arc::new(FakeVectorIndex::default());
    let service = make_service(store.clone(), index);

    service
        .record_feedback(1, 2, FeedbackKind::Like)
        .await
        .unwrap();
    service.remove_feedback(1, 2).await.unwrap();
    service.record_impression(1, 2, "feed", false).await.unwrap();

    assert_eq!(store.writes.load(Ordering::SeqCst), 3);

    let rejected = service.record_feedback(0, 2, FeedbackKind::Like).await;
    assert!(matches!(
        rejected,
        Err(PlatefulError::ValidationError { .. })
    ));
    assert_eq!(store.writes.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_upsert_rejects_wrong_dimension() {
    let store = Arc::new(FakeInteractionStore::default());
    let index = Arc::new(FakeVectorIndex::default());
    let service = make_service(store, index.clone());

    let result = service
        .upsert_recipe(
            1,
            vec![1.0, 0.0],
            RecipePayload {
                title: "Shakshuka".to_string(),
                tags: Vec::new(),
            },
        )
        .await;

    assert!(matches!(
        result,
        Err(PlatefulError::ValidationError { .. })
    ));
    assert_eq!(index.writes.load(Ordering::SeqCst), 0);

    service
        .upsert_recipe(
            1,
            vec![1.0, 0.0, 0.0],
            RecipePayload {
                title: "Shakshuka".to_string(),
                tags: Vec::new(),
            },
        )
        .await
        .unwrap();
    assert_eq!(index.writes.load(Ordering::SeqCst), 1);
}
