use crate::common::{Actor, ReleaseId};
use crate::domains::releases::errors::ReleaseError;
use crate::domains::releases::models::Release;
use crate::kernel::ServerDeps;

/// Load a release the actor is allowed to see.
///
/// Admins see every release, artists only their own. A release owned by
/// someone else is reported exactly like a missing one.
pub async fn find_release_for_actor(
    release_id: ReleaseId,
    actor: &Actor,
    deps: &ServerDeps,
) -> Result<Release, ReleaseError> {
    let release = deps
        .store
        .get_release(release_id)
        .await?
        .ok_or(ReleaseError::NotFound)?;

    if actor.is_admin() || release.artist_id == actor.user_id {
        Ok(release)
    } else {
        Err(ReleaseError::NotFound)
    }
}
