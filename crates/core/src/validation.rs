//! Validation utilities for recommendation requests
//!
//! All validators run before any I/O is issued; a failure rejects the
//! whole request.

use crate::error::PlatefulError;

/// Validate that a user id is a positive integer
///
/// # Examples
///
/// ```
/// use plateful_core::validation::validate_user_id;
///
/// assert!(validate_user_id(42).is_ok());
/// assert!(validate_user_id(0).is_err());
/// assert!(validate_user_id(-1).is_err());
/// ```
pub fn validate_user_id(user_id: i64) -> Result<(), PlatefulError> {
    if user_id > 0 {
        Ok(())
    } else {
        Err(PlatefulError::validation_field(
            format!("user_id must be positive, got {}", user_id),
            "user_id",
        ))
    }
}

/// Validate that a recipe id is a positive integer
///
/// # Examples
///
/// ```
/// use plateful_core::validation::validate_recipe_id;
///
/// assert!(validate_recipe_id(7).is_ok());
/// assert!(validate_recipe_id(0).is_err());
/// ```
pub fn validate_recipe_id(recipe_id: i64) -> Result<(), PlatefulError> {
    if recipe_id > 0 {
        Ok(())
    } else {
        Err(PlatefulError::validation_field(
            format!("recipe_id must be positive, got {}", recipe_id),
            "recipe_id",
        ))
    }
}

/// Validate that a result limit is a positive integer
///
/// # Examples
///
/// ```
/// use plateful_core::validation::validate_limit;
///
/// assert!(validate_limit(10).is_ok());
/// assert!(validate_limit(0).is_err());
/// ```
pub fn validate_limit(limit: usize) -> Result<(), PlatefulError> {
    if limit > 0 {
        Ok(())
    } else {
        Err(PlatefulError::validation_field(
            "limit must be positive",
            "limit",
        ))
    }
}

/// Validate that the over-fetch count covers the requested limit
///
/// # Examples
///
/// ```
/// use plateful_core::validation::validate_fetch_k;
///
/// assert!(validate_fetch_k(20, 10).is_ok());
/// assert!(validate_fetch_k(10, 10).is_ok());
/// assert!(validate_fetch_k(5, 10).is_err());
/// ```
pub fn validate_fetch_k(fetch_k: usize, limit: usize) -> Result<(), PlatefulError> {
    if fetch_k >= limit {
        Ok(())
    } else {
        Err(PlatefulError::validation_field(
            format!("fetch_k ({}) must be >= limit ({})", fetch_k, limit),
            "fetch_k",
        ))
    }
}

/// Validate that the MMR trade-off parameter lies in [0.0, 1.0]
///
/// # Examples
///
/// ```
/// use plateful_core::validation::validate_lambda;
///
/// assert!(validate_lambda(0.5).is_ok());
/// assert!(validate_lambda(0.0).is_ok());
/// assert!(validate_lambda(1.0).is_ok());
/// assert!(validate_lambda(1.5).is_err());
/// assert!(validate_lambda(-0.1).is_err());
/// ```
pub fn validate_lambda(lambda_mult: f32) -> Result<(), PlatefulError> {
    if (0.0..=1.0).contains(&lambda_mult) {
        Ok(())
    } else {
        Err(PlatefulError::validation_field(
            format!(
                "lambda_mult must be between 0.0 and 1.0, got {}",
                lambda_mult
            ),
            "lambda_mult",
        ))
    }
}
