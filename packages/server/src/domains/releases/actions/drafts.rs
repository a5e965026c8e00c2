use tracing::info;

use super::access::find_release_for_actor;
use crate::common::{Actor, ArtistId, ReleaseId, Role};
use crate::domains::releases::errors::ReleaseError;
use crate::domains::releases::models::{NewRelease, Release, ReleaseStatus};
use crate::kernel::ServerDeps;

const MAX_TITLE_CHARS: usize = 200;
const MAX_GENRE_CHARS: usize = 80;

pub(crate) fn validate_text(field: &str, value: &str, max: usize) -> Result<String, ReleaseError> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len == 0 || len > max {
        return Err(ReleaseError::Validation(format!(
            "{field} must be between 1 and {max} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Start a new DRAFT release.
pub async fn create_release(
    title: &str,
    genre: &str,
    actor: &Actor,
    deps: &ServerDeps,
) -> Result<Release, ReleaseError> {
    actor.require(Role::Artist)?;
    let title = validate_text("title", title, MAX_TITLE_CHARS)?;
    let genre = validate_text("genre", genre, MAX_GENRE_CHARS)?;

    let release = deps
        .store
        .create_release(NewRelease {
            artist_id: actor.user_id,
            title,
            genre,
        })
        .await?;

    info!(release_id = %release.id, artist_id = %actor.user_id, "release draft created");
    Ok(release)
}

pub async fn list_releases_for_artist(
    artist_id: ArtistId,
    deps: &ServerDeps,
) -> Result<Vec<Release>, ReleaseError> {
    Ok(deps.store.list_releases_for_artist(artist_id).await?)
}

pub async fn get_release(
    release_id: ReleaseId,
    actor: &Actor,
    deps: &ServerDeps,
) -> Result<Release, ReleaseError> {
    find_release_for_actor(release_id, actor, deps).await
}

/// Edit title and genre; only while DRAFT.
pub async fn update_release_draft(
    release_id: ReleaseId,
    title: &str,
    genre: &str,
    actor: &Actor,
    deps: &ServerDeps,
) -> Result<(), ReleaseError> {
    actor.require(Role::Artist)?;
    let title = validate_text("title", title, MAX_TITLE_CHARS)?;
    let genre = validate_text("genre", genre, MAX_GENRE_CHARS)?;
    find_release_for_actor(release_id, actor, deps).await?;

    if deps
        .store
        .update_release_draft(release_id, &title, &genre)
        .await?
    {
        Ok(())
    } else {
        Err(not_editable(release_id, actor, deps).await)
    }
}

/// Explain why a DRAFT-guarded write on a visible release did not apply.
pub(crate) async fn not_editable(
    release_id: ReleaseId,
    actor: &Actor,
    deps: &ServerDeps,
) -> ReleaseError {
    match find_release_for_actor(release_id, actor, deps).await {
        Ok(release) if release.status != ReleaseStatus::Draft => {
            ReleaseError::InvalidState("release is not editable".to_string())
        }
        Ok(_) => ReleaseError::TrackNotFound,
        Err(e) => e,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::UserId;
    use crate::kernel::{BaseReleaseStore, TestDependencies};

    #[tokio::test]
    async fn test_create_validates_lengths() {
        let test = TestDependencies::new();
        let artist = Actor::artist(UserId::new());

        let empty = create_release("   ", "House", &artist, &test.deps).await;
        assert!(matches!(empty, Err(ReleaseError::Validation(_))));

        let long_genre = "g".repeat(81);
        let too_long = create_release("Title", &long_genre, &artist, &test.deps).await;
        assert!(matches!(too_long, Err(ReleaseError::Validation(_))));

        let release = create_release(" Title ", "House", &artist, &test.deps)
            .await
            .unwrap();
        assert_eq!(release.title, "Title");
        assert_eq!(release.status, ReleaseStatus::Draft);
    }

    #[tokio::test]
    async fn test_admin_cannot_create_release() {
        let test = TestDependencies::new();
        let admin = Actor::admin(UserId::new());

        let result = create_release("Title", "House", &admin, &test.deps).await;
        assert!(matches!(result, Err(ReleaseError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_update_rejected_after_submission() {
        let test = TestDependencies::new();
        let artist_id = UserId::new();
        let artist = Actor::artist(artist_id);
        let release = test.draft_release(artist_id).await;

        update_release_draft(release.id, "Renamed", "Ambient", &artist, &test.deps)
            .await
            .unwrap();

        test.store
            .conditional_transition(
                release.id,
                Some(ReleaseStatus::Draft),
                ReleaseStatus::Processing,
            )
            .await
            .unwrap();

        let frozen =
            update_release_draft(release.id, "Again", "Ambient", &artist, &test.deps).await;
        assert!(matches!(frozen, Err(ReleaseError::InvalidState(_))));

        let stored = test.store.get_release(release.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Renamed");
    }

    #[tokio::test]
    async fn test_artist_lists_only_own_releases() {
        let test = TestDependencies::new();
        let artist_id = UserId::new();
        let older = test.draft_release(artist_id).await;
        let newer = test.draft_release(artist_id).await;
        test.draft_release(UserId::new()).await;

        let releases = list_releases_for_artist(artist_id, &test.deps).await.unwrap();
        let ids: Vec<ReleaseId> = releases.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }
}
