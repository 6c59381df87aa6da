//! Error handling module for the audit backend.
//!
//! Provides the request-level error type with its mapping to HTTP status codes
//! and the JSON error body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::storage::StorageError;

/// Internal error codes, used in logs and `Display` output.
pub mod codes {
    pub const MISSING_PARAMETER: &str = "MISSING_PARAMETER";
    pub const INVALID_PAYLOAD: &str = "INVALID_PAYLOAD";
    pub const DUPLICATE_PROJECT: &str = "DUPLICATE_PROJECT";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const INVALID_CATEGORY: &str = "INVALID_CATEGORY";
    pub const QUERY_TOO_LONG: &str = "QUERY_TOO_LONG";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
}

/// Application error type. Every variant is terminal for the current request.
#[derive(Debug)]
pub enum AppError {
    /// A required request parameter is absent or empty
    MissingParameter(String),
    /// Request body is not a usable project document
    InvalidPayload(String),
    /// A project with the same name and owner already exists
    DuplicateProject(String),
    /// Resource not found
    NotFound(String),
    /// Autocomplete category is not one of the known categories
    InvalidCategory(String),
    /// Autocomplete query exceeds the length limit
    QueryTooLong(String),
    /// Blob store failure
    Storage(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingParameter(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidPayload(_) => StatusCode::NOT_ACCEPTABLE,
            AppError::DuplicateProject(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidCategory(_) => StatusCode::NOT_ACCEPTABLE,
            AppError::QueryTooLong(_) => StatusCode::LENGTH_REQUIRED,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::MissingParameter(_) => codes::MISSING_PARAMETER,
            AppError::InvalidPayload(_) => codes::INVALID_PAYLOAD,
            AppError::DuplicateProject(_) => codes::DUPLICATE_PROJECT,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::InvalidCategory(_) => codes::INVALID_CATEGORY,
            AppError::QueryTooLong(_) => codes::QUERY_TOO_LONG,
            AppError::Storage(_) => codes::STORAGE_ERROR,
        }
    }

    /// Get the human-readable description.
    pub fn message(&self) -> &str {
        match self {
            AppError::MissingParameter(msg)
            | AppError::InvalidPayload(msg)
            | AppError::DuplicateProject(msg)
            | AppError::NotFound(msg)
            | AppError::InvalidCategory(msg)
            | AppError::QueryTooLong(msg)
            | AppError::Storage(msg) => msg,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        tracing::error!("Storage error: {:?}", err);
        AppError::Storage(format!("Storage error: {}", err))
    }
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: &AppError) -> Self {
        Self {
            message: error.message().to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::debug!("{}", self);
        }
        (status, Json(ErrorResponse::new(&self))).into_response()
    }
}
