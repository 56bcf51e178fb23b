use serde::{Deserialize, Serialize};

/// Recommendation Service Configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecsysConfig {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Vector index configuration
    pub vector: VectorConfig,

    /// Embedding API configuration
    pub embedding: EmbeddingConfig,

    /// Request bound configuration
    #[serde(default)]
    pub recommend: RecommendConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server host
    pub host: String,

    /// Server port (default: 8083)
    pub port: u16,

    /// Worker threads
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Connection pool size
    pub max_connections: u32,

    /// Connection timeout
    pub connect_timeout_sec: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VectorConfig {
    /// Qdrant server URL
    pub qdrant_url: String,

    /// Collection name
    pub collection_name: String,

    /// Embedding dimension (default: 1024)
    pub dimension: usize,

    /// HNSW ef_search parameter
    pub ef_search: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmbeddingConfig {
    /// Embedding model name
    pub model: String,

    /// API endpoint
    pub api_url: String,

    /// API key
    pub api_key: String,

    /// Request timeout
    pub timeout_ms: u64,
}

/// Upper bounds enforced on incoming recommendation requests
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecommendConfig {
    /// Largest accepted result limit
    pub max_limit: usize,

    /// Largest accepted candidate pool size
    pub max_fetch_k: usize,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            max_limit: 100,
            max_fetch_k: 200,
        }
    }
}

impl Default for RecsysConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8083,
                workers: None,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/plateful".to_string(),
                max_connections: 10,
                connect_timeout_sec: 10,
            },
            vector: VectorConfig {
                qdrant_url: "http://localhost:6334".to_string(),
                collection_name: "recipe_embeddings".to_string(),
                dimension: 1024,
                ef_search: 64,
            },
            embedding: EmbeddingConfig {
                model: "text-embedding-3-large".to_string(),
                api_url: "https://api.openai.com/v1/embeddings".to_string(),
                api_key: String::new(),
                timeout_ms: 5000,
            },
            recommend: RecommendConfig::default(),
        }
    }
}

impl RecsysConfig {
    /// Load configuration from environment and config file
    pub fn load() -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/recsys").required(false))
            .add_source(config::Environment::with_prefix("RECSYS"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
