//! HTTP surface of the recommendation service
//!
//! Thin JSON handlers around [`RecommendationService`]. Request bounds
//! (`limit`, `fetch_k`) are enforced here; the service re-validates the
//! core invariants before any I/O.

use std::sync::Arc;

use actix_web::{web, HttpResponse};
use plateful_core::PlatefulError;
use serde::Deserialize;

use crate::config::RecommendConfig;
use crate::embedding::{recipe_document, EmbeddingClient};
use crate::recommender::RecommendationService;
use crate::types::{FeedbackKind, RecipePayload, RecommendationRequest};

/// Shared application state
pub struct AppState {
    pub service: Arc<RecommendationService>,
    pub embeddings: Arc<EmbeddingClient>,
    pub bounds: RecommendConfig,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/recommendations", web::post().to(recommendations))
        .route("/feedback", web::post().to(add_feedback))
        .route("/feedback", web::delete().to(remove_feedback))
        .route("/impressions", web::post().to(add_impression))
        .route("/recipes", web::put().to(upsert_recipe))
        .route("/recipes/stats", web::get().to(recipe_stats))
        .route("/recipes/{id}", web::delete().to(remove_recipe));
}

async fn recommendations(
    state: web::Data<AppState>,
    body: web::Json<RecommendationRequest>,
) -> Result<HttpResponse, PlatefulError> {
    let request = body.into_inner();

    if request.limit > state.bounds.max_limit {
        return Err(PlatefulError::validation_field(
            format!("limit must be at most {}", state.bounds.max_limit),
            "limit",
        ));
    }
    if request.fetch_k > state.bounds.max_fetch_k {
        return Err(PlatefulError::validation_field(
            format!("fetch_k must be at most {}", state.bounds.max_fetch_k),
            "fetch_k",
        ));
    }

    let recommendations = state.service.recommend(&request).await?;
    Ok(HttpResponse::Ok().json(recommendations))
}

#[derive(Debug, Deserialize)]
struct FeedbackRequest {
    user_id: i64,
    recipe_id: i64,
    kind: FeedbackKind,
}

async fn add_feedback(
    state: web::Data<AppState>,
    body: web::Json<FeedbackRequest>,
) -> Result<HttpResponse, PlatefulError> {
    let request = body.into_inner();

    state
        .service
        .record_feedback(request.user_id, request.recipe_id, request.kind)
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

#[derive(Debug, Deserialize)]
struct FeedbackRemovalRequest {
    user_id: i64,
    recipe_id: i64,
}

async fn remove_feedback(
    state: web::Data<AppState>,
    body: web::Json<FeedbackRemovalRequest>,
) -> Result<HttpResponse, PlatefulError> {
    let request = body.into_inner();

    state
        .service
        .remove_feedback(request.user_id, request.recipe_id)
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

#[derive(Debug, Deserialize)]
struct ImpressionRequest {
    user_id: i64,
    recipe_id: i64,
    source: String,
    #[serde(default)]
    is_detail: bool,
}

async fn add_impression(
    state: web::Data<AppState>,
    body: web::Json<ImpressionRequest>,
) -> Result<HttpResponse, PlatefulError> {
    let request = body.into_inner();

    state
        .service
        .record_impression(
            request.user_id,
            request.recipe_id,
            &request.source,
            request.is_detail,
        )
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

#[derive(Debug, Deserialize)]
struct UpsertRecipeRequest {
    recipe_id: i64,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    ingredients: Vec<String>,
    #[serde(default)]
    tags: Vec<String>,
}

async fn upsert_recipe(
    state: web::Data<AppState>,
    body: web::Json<UpsertRecipeRequest>,
) -> Result<HttpResponse, PlatefulError> {
    let request = body.into_inner();

    let document = recipe_document(&request.title, &request.description, &request.ingredients);
    let vector = state
        .embeddings
        .generate(&document)
        .await
        .map_err(|e| PlatefulError::EmbeddingError(e.to_string()))?;

    state
        .service
        .upsert_recipe(
            request.recipe_id,
            vector,
            RecipePayload {
                title: request.title,
                tags: request.tags,
            },
        )
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

async fn remove_recipe(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, PlatefulError> {
    let recipe_id = path.into_inner();

    state.service.remove_recipe(recipe_id).await?;

    Ok(HttpResponse::NoContent().finish())
}

async fn recipe_stats(state: web::Data<AppState>) -> Result<HttpResponse, PlatefulError> {
    let indexed_recipes = state.service.indexed_recipe_count().await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "indexed_recipes": indexed_recipes,
    })))
}

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "recsys-service",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn readiness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ready",
    }))
}
