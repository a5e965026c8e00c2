//! Upload finalization.
//!
//! Clients upload directly to object storage, then call these routes with
//! the object key so the release or track records it.

use axum::{extract::Extension, Json};
use serde::Deserialize;

use crate::common::{ReleaseId, TrackId};
use crate::domains::releases::actions;
use crate::domains::releases::models::AssetRef;
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::server::extract::ApiJson;
use crate::server::middleware::AuthUser;

#[derive(Debug, Deserialize)]
pub struct FinalizeCoverArtInput {
    pub release_id: ReleaseId,
    pub object_key: String,
    pub public_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FinalizeTrackAudioInput {
    pub release_id: ReleaseId,
    pub track_id: TrackId,
    pub object_key: String,
    pub public_url: Option<String>,
}

pub async fn finalize_cover_art_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    ApiJson(input): ApiJson<FinalizeCoverArtInput>,
) -> ApiResult<Json<AssetRef>> {
    let asset = actions::finalize_cover_art(
        input.release_id,
        &input.object_key,
        input.public_url,
        &user.actor(),
        &state.server_deps,
    )
    .await?;
    Ok(Json(asset))
}

pub async fn finalize_track_audio_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    ApiJson(input): ApiJson<FinalizeTrackAudioInput>,
) -> ApiResult<Json<AssetRef>> {
    let asset = actions::finalize_track_audio(
        input.release_id,
        input.track_id,
        &input.object_key,
        input.public_url,
        &user.actor(),
        &state.server_deps,
    )
    .await?;
    Ok(Json(asset))
}
