//! Autocomplete API endpoint.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use super::{require_param, ApiResult};
use crate::AppState;

/// Autocomplete query parameters.
#[derive(Debug, Deserialize)]
pub struct AutocompleteQuery {
    /// Category to search: `languages`, `IDEs` or `misc`.
    #[serde(default, rename = "type")]
    pub category: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

const PARAMS_REQUIRED: &str = "type and search are required";

/// GET /api/autocomplete - Suggest registered tags matching a substring.
pub async fn autocomplete(
    State(state): State<AppState>,
    Query(params): Query<AutocompleteQuery>,
) -> ApiResult<Json<Vec<String>>> {
    let category = require_param(params.category, PARAMS_REQUIRED)?;
    let search = require_param(params.search, PARAMS_REQUIRED)?;

    let results = state.tags.search(&category, &search).await?;
    Ok(Json(results))
}
