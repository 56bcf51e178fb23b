//! Recsys Service - Personalized Recipe Recommendations
//!
//! Port: 8083

use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use plateful_recsys::config::RecsysConfig;
use plateful_recsys::embedding::EmbeddingClient;
use plateful_recsys::index::QdrantRecipeIndex;
use plateful_recsys::interactions::PostgresInteractionStore;
use plateful_recsys::recommender::RecommendationService;
use plateful_recsys::server::{self, AppState};
use tracing::info;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .json()
        .init();

    let config = RecsysConfig::load().unwrap_or_else(|e| {
        tracing::warn!("Failed to load configuration ({}), using defaults", e);
        RecsysConfig::default()
    });
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);

    info!("Starting Recsys Service on {}", bind_addr);

    let db_pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(
            config.database.connect_timeout_sec,
        ))
        .connect(&config.database.url)
        .await?;

    let index = QdrantRecipeIndex::new(
        &config.vector.qdrant_url,
        config.vector.collection_name.clone(),
        config.vector.dimension,
        config.vector.ef_search,
    )?;
    index.ensure_collection().await?;

    let embeddings = Arc::new(EmbeddingClient::new(
        &config.embedding,
        config.vector.dimension,
    )?);

    let service = Arc::new(RecommendationService::new(
        Arc::new(PostgresInteractionStore::new(db_pool)),
        Arc::new(index),
        config.vector.dimension,
    ));

    let app_state = web::Data::new(AppState {
        service,
        embeddings,
        bounds: config.recommend.clone(),
    });

    let workers = config.server.workers.unwrap_or_else(num_cpus::get);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .route("/health", web::get().to(server::health_check))
            .route("/ready", web::get().to(server::readiness_check))
            .configure(server::configure_routes)
            .wrap(actix_web::middleware::Logger::default())
    })
    .workers(workers)
    .bind(&bind_addr)?
    .run()
    .await?;

    Ok(())
}
