//! Repository query handlers

use super::types::{ErrorResponse, RepositoryDetails, RepositorySummary};
use crate::{ApiError, AppState};
use axum::{
    extract::{Path, State},
    response::Json,
};
use tracing::info;

/// List summaries of every configured repository
#[utoipa::path(
    get,
    path = "/api/repositories",
    tag = "Repository",
    summary = "List repositories",
    description = "Summaries of every configured repository, in configuration order. Fails as a whole if any repository cannot be fetched.",
    responses(
        (status = 200, description = "Repository summaries", body = Vec<RepositorySummary>),
        (status = 404, description = "A configured repository does not exist", body = ErrorResponse),
        (status = 502, description = "The remote API failed", body = ErrorResponse),
        (status = 500, description = "Configuration or internal error", body = ErrorResponse)
    )
)]
pub async fn list_repositories(
    State(state): State<AppState>,
) -> Result<Json<Vec<RepositorySummary>>, ApiError> {
    info!(
        "Listing {} configured repositories",
        state.repositories.repositories().len()
    );

    let summaries = state.repositories.list_summaries().await?;

    Ok(Json(summaries))
}

/// Get details of one repository
#[utoipa::path(
    get,
    path = "/api/repositories/{name}",
    tag = "Repository",
    summary = "Get repository details",
    description = "Size, file count, configuration file sample and active webhooks of a repository owned by the authenticated account",
    params(
        ("name" = String, Path, description = "Repository name")
    ),
    responses(
        (status = 200, description = "Repository details", body = RepositoryDetails),
        (status = 404, description = "Repository not found", body = ErrorResponse),
        (status = 422, description = "Repository tree is truncated", body = ErrorResponse),
        (status = 502, description = "The remote API failed", body = ErrorResponse),
        (status = 500, description = "Configuration or internal error", body = ErrorResponse)
    )
)]
pub async fn get_repository(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<RepositoryDetails>, ApiError> {
    info!("Fetching details for repository: {}", name);

    let details = state.repositories.fetch_details(&name).await?;

    Ok(Json(details))
}
