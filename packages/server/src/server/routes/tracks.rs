use axum::{
    extract::Extension,
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::common::{ReleaseId, TrackId};
use crate::domains::releases::actions;
use crate::domains::releases::Track;
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::server::extract::{ApiJson, ApiPath};
use crate::server::middleware::AuthUser;

#[derive(Debug, Deserialize)]
pub struct CreateTrackInput {
    pub title: String,
    pub isrc: String,
    pub duration_seconds: Option<i32>,
}

/// Omitted ISRC or duration keeps the stored value.
#[derive(Debug, Deserialize)]
pub struct UpdateTrackInput {
    pub title: String,
    pub isrc: Option<String>,
    pub duration_seconds: Option<i32>,
}

pub async fn create_track_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    ApiPath(release_id): ApiPath<ReleaseId>,
    ApiJson(input): ApiJson<CreateTrackInput>,
) -> ApiResult<(StatusCode, Json<Track>)> {
    let track = actions::create_track(
        release_id,
        &input.title,
        &input.isrc,
        input.duration_seconds,
        &user.actor(),
        &state.server_deps,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(track)))
}

pub async fn list_tracks_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    ApiPath(release_id): ApiPath<ReleaseId>,
) -> ApiResult<Json<Vec<Track>>> {
    let tracks = actions::list_tracks(release_id, &user.actor(), &state.server_deps).await?;
    Ok(Json(tracks))
}

pub async fn update_track_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    ApiPath((release_id, track_id)): ApiPath<(ReleaseId, TrackId)>,
    ApiJson(input): ApiJson<UpdateTrackInput>,
) -> ApiResult<StatusCode> {
    actions::update_track(
        release_id,
        track_id,
        &input.title,
        input.isrc.as_deref(),
        input.duration_seconds,
        &user.actor(),
        &state.server_deps,
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_track_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    ApiPath((release_id, track_id)): ApiPath<(ReleaseId, TrackId)>,
) -> ApiResult<StatusCode> {
    actions::delete_track(release_id, track_id, &user.actor(), &state.server_deps).await?;
    Ok(StatusCode::NO_CONTENT)
}
