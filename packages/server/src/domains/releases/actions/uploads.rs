//! Recording finished uploads.
//!
//! Objects are uploaded straight to storage by the client; these calls only
//! record the key once the upload is done. Keys must live under the
//! release's own prefix so one release cannot claim another's objects.

use tracing::info;

use super::access::find_release_for_actor;
use super::drafts::not_editable;
use crate::common::{Actor, ReleaseId, TrackId};
use crate::domains::releases::errors::ReleaseError;
use crate::domains::releases::models::AssetRef;
use crate::kernel::ServerDeps;

fn asset_for(
    release_id: ReleaseId,
    object_key: &str,
    public_url: Option<String>,
) -> Result<AssetRef, ReleaseError> {
    let prefix = format!("releases/{release_id}/");
    let object_key = object_key.trim();
    if !object_key.starts_with(&prefix) || object_key.len() == prefix.len() {
        return Err(ReleaseError::Validation(format!(
            "object_key must start with {prefix}"
        )));
    }
    Ok(AssetRef {
        object_key: object_key.to_string(),
        public_url: public_url.filter(|url| !url.trim().is_empty()),
    })
}

pub async fn finalize_cover_art(
    release_id: ReleaseId,
    object_key: &str,
    public_url: Option<String>,
    actor: &Actor,
    deps: &ServerDeps,
) -> Result<AssetRef, ReleaseError> {
    let asset = asset_for(release_id, object_key, public_url)?;
    find_release_for_actor(release_id, actor, deps).await?;

    if !deps.store.set_cover_art(release_id, asset.clone()).await? {
        return Err(ReleaseError::InvalidState(
            "release is not editable".to_string(),
        ));
    }

    info!(release_id = %release_id, object_key = %asset.object_key, "cover art finalized");
    Ok(asset)
}

/// Attach uploaded audio to a track. This is what makes a track complete.
pub async fn finalize_track_audio(
    release_id: ReleaseId,
    track_id: TrackId,
    object_key: &str,
    public_url: Option<String>,
    actor: &Actor,
    deps: &ServerDeps,
) -> Result<AssetRef, ReleaseError> {
    let asset = asset_for(release_id, object_key, public_url)?;
    find_release_for_actor(release_id, actor, deps).await?;

    if !deps
        .store
        .attach_track_audio(release_id, track_id, asset.clone())
        .await?
    {
        return Err(not_editable(release_id, actor, deps).await);
    }

    info!(release_id = %release_id, track_id = %track_id, "track audio finalized");
    Ok(asset)
}
