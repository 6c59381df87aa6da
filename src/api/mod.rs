//! REST API module.
//!
//! Handlers check required parameters, delegate to the repositories, and
//! map the outcome to a status code.

mod autocomplete;
mod projects;

pub use autocomplete::*;
pub use projects::*;

use crate::errors::AppError;

/// Response type for every API handler.
pub type ApiResult<T> = Result<T, AppError>;

/// Guard for a required query parameter. Absent and empty values are both rejected.
pub fn require_param(value: Option<String>, description: &str) -> ApiResult<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::MissingParameter(description.to_string())),
    }
}
