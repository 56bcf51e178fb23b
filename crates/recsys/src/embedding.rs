//! Embedding client for recipe text
//!
//! Calls an OpenAI-compatible embeddings endpoint when a recipe is added
//! or updated. The recommendation read path never touches this client;
//! it only reads vectors already stored in the index.

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::EmbeddingConfig;

const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 100;

#[derive(Debug, Serialize)]
struct EmbeddingRequest {
    input: String,
    model: String,
    dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
    #[serde(rename = "type")]
    error_type: String,
}

/// HTTP embedding client with bounded retry
#[derive(Clone)]
pub struct EmbeddingClient {
    http_client: Client,
    api_url: String,
    api_key: String,
    model: String,
    dimension: usize,
}

impl EmbeddingClient {
    pub fn new(config: &EmbeddingConfig, dimension: usize) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            http_client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            dimension,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Generate an embedding for a single text, retrying transient
    /// failures with doubling backoff.
    pub async fn generate(&self, text: &str) -> Result<Vec<f32>> {
        let mut last_error = None;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        for attempt in 1..=MAX_RETRIES {
            match self.call_api(text).await {
                Ok(embedding) => return Ok(embedding),
                Err(e) => {
                    warn!(
                        attempt,
                        backoff_ms,
                        error = %e,
                        "Embedding API call failed, retrying"
                    );
                    last_error = Some(e);

                    if attempt < MAX_RETRIES {
                        tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                        backoff_ms *= 2;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow!("Embedding failed after {} retries", MAX_RETRIES)))
    }

    async fn call_api(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbeddingRequest {
            input: text.to_string(),
            model: self.model.clone(),
            dimensions: Some(self.dimension),
        };

        debug!(model = %self.model, "Calling embedding API");

        let response = self
            .http_client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_text) {
                return Err(anyhow!(
                    "Embedding API error ({}): {} - {}",
                    status,
                    error_response.error.error_type,
                    error_response.error.message
                ));
            }
            return Err(anyhow!("Embedding API error ({}): {}", status, error_text));
        }

        let embedding_response: EmbeddingResponse = response.json().await?;
        let embedding = embedding_response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| anyhow!("Empty embedding response"))?;

        if embedding.len() != self.dimension {
            return Err(anyhow!(
                "Embedding dimension mismatch: expected {}, got {}",
                self.dimension,
                embedding.len()
            ));
        }

        Ok(embedding)
    }
}

/// Compose the text embedded for a recipe.
pub fn recipe_document(title: &str, description: &str, ingredients: &[String]) -> String {
    let mut document = title.to_string();

    if !description.is_empty() {
        document.push('\n');
        document.push_str(description);
    }
    if !ingredients.is_empty() {
        document.push('\n');
        document.push_str(&ingredients.join(", "));
    }

    document
}
