use axum::{
    extract::{Extension, Query},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::common::ReleaseId;
use crate::domains::releases::actions;
use crate::domains::releases::{Release, ReleaseStatus};
use crate::server::app::AppState;
use crate::server::error::{ApiError, ApiResult};
use crate::server::extract::ApiPath;
use crate::server::middleware::AuthUser;

#[derive(Debug, Deserialize)]
pub struct ListReleasesQuery {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub ok: bool,
    pub status: ReleaseStatus,
}

pub async fn list_releases_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Query(query): Query<ListReleasesQuery>,
) -> ApiResult<Json<Vec<Release>>> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<ReleaseStatus>)
        .transpose()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let releases = actions::list_releases_admin(status, &user.actor(), &state.server_deps).await?;
    Ok(Json(releases))
}

/// The review queue, oldest first.
pub async fn pending_review_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<Release>>> {
    let releases = actions::list_pending_review(&user.actor(), &state.server_deps).await?;
    Ok(Json(releases))
}

pub async fn approve_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    ApiPath(release_id): ApiPath<ReleaseId>,
) -> ApiResult<Json<ReviewResponse>> {
    let status = actions::approve_release(release_id, &user.actor(), &state.server_deps).await?;
    Ok(Json(ReviewResponse { ok: true, status }))
}

pub async fn reject_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    ApiPath(release_id): ApiPath<ReleaseId>,
) -> ApiResult<Json<ReviewResponse>> {
    let status = actions::reject_release(release_id, &user.actor(), &state.server_deps).await?;
    Ok(Json(ReviewResponse { ok: true, status }))
}
