//! # Plateful Core
//!
//! Shared building blocks for Plateful services.
//!
//! This crate provides the fundamental pieces used across the Plateful
//! recipe platform: error handling, vector math, and request validation.
//!
//! ## Modules
//!
//! - `error`: Error types and handling
//! - `math`: Mathematical utilities for vector operations
//! - `validation`: Validation utilities and functions

pub mod error;
pub mod math;
pub mod validation;

pub use error::PlatefulError;
pub use math::{cosine_similarity, dot_product, l2_norm, normalize_vector};
pub use validation::{
    validate_fetch_k, validate_lambda, validate_limit, validate_recipe_id, validate_user_id,
};

/// Result type alias for Plateful operations
pub type Result<T> = std::result::Result<T, PlatefulError>;
