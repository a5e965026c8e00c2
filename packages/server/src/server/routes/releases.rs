//! Artist-facing release routes.

use axum::{
    extract::Extension,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::common::{ReleaseId, Role};
use crate::domains::releases::actions::{self, SubmitOutcome};
use crate::domains::releases::Release;
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::server::extract::{ApiJson, ApiPath};
use crate::server::middleware::AuthUser;

#[derive(Debug, Deserialize)]
pub struct ReleaseInput {
    pub title: String,
    pub genre: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub ok: bool,
    pub state: SubmitOutcome,
}

pub async fn create_release_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    ApiJson(input): ApiJson<ReleaseInput>,
) -> ApiResult<(StatusCode, Json<Release>)> {
    let release = actions::create_release(
        &input.title,
        &input.genre,
        &user.actor(),
        &state.server_deps,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(release)))
}

pub async fn list_releases_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<Release>>> {
    user.actor().require(Role::Artist)?;
    let releases = actions::list_releases_for_artist(user.user_id, &state.server_deps).await?;
    Ok(Json(releases))
}

pub async fn get_release_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    ApiPath(release_id): ApiPath<ReleaseId>,
) -> ApiResult<Json<Release>> {
    let release = actions::get_release(release_id, &user.actor(), &state.server_deps).await?;
    Ok(Json(release))
}

pub async fn update_release_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    ApiPath(release_id): ApiPath<ReleaseId>,
    ApiJson(input): ApiJson<ReleaseInput>,
) -> ApiResult<Json<Release>> {
    let actor = user.actor();
    actions::update_release_draft(
        release_id,
        &input.title,
        &input.genre,
        &actor,
        &state.server_deps,
    )
    .await?;
    let release = actions::get_release(release_id, &actor, &state.server_deps).await?;
    Ok(Json(release))
}

/// `{ "ok": true, "state": "processing_started" | "already_processing" | "already_submitted" }`
pub async fn submit_release_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    ApiPath(release_id): ApiPath<ReleaseId>,
) -> ApiResult<Json<SubmitResponse>> {
    user.actor().require(Role::Artist)?;
    let outcome = actions::submit_release(release_id, user.user_id, &state.server_deps).await?;
    Ok(Json(SubmitResponse {
        ok: true,
        state: outcome,
    }))
}
