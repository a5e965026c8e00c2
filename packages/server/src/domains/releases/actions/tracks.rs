use tracing::info;

use super::access::find_release_for_actor;
use super::drafts::{not_editable, validate_text};
use crate::common::{Actor, ReleaseId, Role, TrackId};
use crate::domains::releases::errors::ReleaseError;
use crate::domains::releases::models::{NewTrack, Track, TrackUpdate};
use crate::kernel::ServerDeps;

const MAX_TRACK_TITLE_CHARS: usize = 200;
const ISRC_LEN: usize = 12;

fn validate_isrc(isrc: &str) -> Result<String, ReleaseError> {
    let isrc = isrc.trim();
    if isrc.chars().count() != ISRC_LEN {
        return Err(ReleaseError::Validation(format!(
            "isrc must be exactly {ISRC_LEN} characters"
        )));
    }
    Ok(isrc.to_string())
}

fn validate_duration(duration_seconds: Option<i32>) -> Result<Option<i32>, ReleaseError> {
    match duration_seconds {
        Some(d) if d < 1 => Err(ReleaseError::Validation(
            "duration_seconds must be at least 1".to_string(),
        )),
        other => Ok(other),
    }
}

/// Add a track to a DRAFT release.
pub async fn create_track(
    release_id: ReleaseId,
    title: &str,
    isrc: &str,
    duration_seconds: Option<i32>,
    actor: &Actor,
    deps: &ServerDeps,
) -> Result<Track, ReleaseError> {
    actor.require(Role::Artist)?;
    let new = NewTrack {
        title: validate_text("title", title, MAX_TRACK_TITLE_CHARS)?,
        isrc: validate_isrc(isrc)?,
        duration_seconds: validate_duration(duration_seconds)?,
    };
    find_release_for_actor(release_id, actor, deps).await?;

    let track = deps
        .store
        .create_track(release_id, new)
        .await?
        .ok_or_else(|| ReleaseError::InvalidState("release is not editable".to_string()))?;

    info!(release_id = %release_id, track_id = %track.id, "track added");
    Ok(track)
}

pub async fn list_tracks(
    release_id: ReleaseId,
    actor: &Actor,
    deps: &ServerDeps,
) -> Result<Vec<Track>, ReleaseError> {
    find_release_for_actor(release_id, actor, deps).await?;
    Ok(deps.store.list_tracks(release_id).await?)
}

pub async fn update_track(
    release_id: ReleaseId,
    track_id: TrackId,
    title: &str,
    isrc: Option<&str>,
    duration_seconds: Option<i32>,
    actor: &Actor,
    deps: &ServerDeps,
) -> Result<(), ReleaseError> {
    actor.require(Role::Artist)?;
    let update = TrackUpdate {
        title: validate_text("title", title, MAX_TRACK_TITLE_CHARS)?,
        isrc: isrc.map(validate_isrc).transpose()?,
        duration_seconds: validate_duration(duration_seconds)?,
    };
    find_release_for_actor(release_id, actor, deps).await?;

    if deps.store.update_track(release_id, track_id, update).await? {
        Ok(())
    } else {
        Err(not_editable(release_id, actor, deps).await)
    }
}

pub async fn delete_track(
    release_id: ReleaseId,
    track_id: TrackId,
    actor: &Actor,
    deps: &ServerDeps,
) -> Result<(), ReleaseError> {
    actor.require(Role::Artist)?;
    find_release_for_actor(release_id, actor, deps).await?;

    if deps.store.delete_track(release_id, track_id).await? {
        info!(release_id = %release_id, track_id = %track_id, "track deleted");
        Ok(())
    } else {
        Err(not_editable(release_id, actor, deps).await)
    }
}
