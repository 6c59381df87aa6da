//! Project API endpoints.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::{require_param, ApiResult};
use crate::errors::AppError;
use crate::models::Project;
use crate::AppState;

/// Query parameters scoping a request to one owner.
#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    #[serde(default)]
    pub owner_email: Option<String>,
}

const OWNER_REQUIRED: &str = "owner_email is required";

/// GET /api/projects - List the owner's projects.
pub async fn list_projects(
    State(state): State<AppState>,
    Query(params): Query<OwnerQuery>,
) -> ApiResult<Json<Vec<Project>>> {
    let owner_email = require_param(params.owner_email, OWNER_REQUIRED)?;
    let projects = state.projects.list_by_owner(&owner_email).await?;
    Ok(Json(projects))
}

/// GET /api/projects/{name} - Get one of the owner's projects by name.
pub async fn get_project(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<OwnerQuery>,
) -> ApiResult<Json<Project>> {
    let owner_email = require_param(params.owner_email, OWNER_REQUIRED)?;
    let project = state
        .projects
        .get_by_owner_and_name(&owner_email, &name)
        .await?;
    Ok(Json(project))
}

/// POST /api/projects - Create a new project.
///
/// The body is parsed by hand so that malformed JSON maps to 406 like any
/// other unusable payload.
pub async fn create_project(
    State(state): State<AppState>,
    Query(params): Query<OwnerQuery>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let owner_email = require_param(params.owner_email, OWNER_REQUIRED)?;

    let project: Project = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!("Rejected project payload: {}", e);
        AppError::InvalidPayload("Missing JSON data".to_string())
    })?;

    if let Some(body_owner) = project.owner_email() {
        if body_owner != owner_email {
            tracing::warn!(
                "owner_email {} does not match project owner {}",
                owner_email,
                body_owner
            );
        }
    }

    let project = state.projects.create(project).await?;
    Ok((StatusCode::CREATED, Json(project)))
}
