use actix_web::{HttpResponse, ResponseError};

/// Error type shared by Plateful services
#[derive(Debug, thiserror::Error)]
pub enum PlatefulError {
    #[error("Validation error: {message}")]
    ValidationError {
        message: String,
        field: Option<String>,
    },

    #[error("Configuration error: {message}")]
    ConfigurationError {
        message: String,
        key: Option<String>,
    },

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Vector index error: {0}")]
    VectorIndexError(String),

    #[error("Embedding error: {0}")]
    EmbeddingError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl PlatefulError {
    /// Validation error attached to a specific field
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        PlatefulError::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Validation error not tied to a single field
    pub fn validation(message: impl Into<String>) -> Self {
        PlatefulError::ValidationError {
            message: message.into(),
            field: None,
        }
    }
}

impl From<sqlx::Error> for PlatefulError {
    fn from(err: sqlx::Error) -> Self {
        PlatefulError::DatabaseError(err.to_string())
    }
}

impl From<anyhow::Error> for PlatefulError {
    fn from(err: anyhow::Error) -> Self {
        PlatefulError::InternalError(err.to_string())
    }
}

impl ResponseError for PlatefulError {
    fn error_response(&self) -> HttpResponse {
        match self {
            PlatefulError::ValidationError { message, field } => {
                HttpResponse::BadRequest().json(serde_json::json!({
                    "error": "validation_error",
                    "error_description": message,
                    "field": field,
                }))
            }
            PlatefulError::ConfigurationError { message, .. } => {
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "configuration_error",
                    "error_description": message,
                }))
            }
            PlatefulError::NotFound(what) => HttpResponse::NotFound().json(serde_json::json!({
                "error": "not_found",
                "error_description": what,
            })),
            PlatefulError::DatabaseError(_)
            | PlatefulError::VectorIndexError(_)
            | PlatefulError::EmbeddingError(_)
            | PlatefulError::InternalError(_) => {
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "internal_error",
                    "error_description": "Internal server error",
                }))
            }
        }
    }
}
