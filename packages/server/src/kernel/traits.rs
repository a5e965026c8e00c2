// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Lifecycle rules live in domains/releases/actions and use these traits.
//
// Naming convention: Base* for trait names (e.g., BaseReleaseStore)

use async_trait::async_trait;

use crate::common::{ArtistId, ReleaseId, TrackId};
use crate::domains::releases::completeness::TrackCompleteness;
use crate::domains::releases::errors::StoreError;
use crate::domains::releases::models::{
    AssetRef, NewRelease, NewTrack, Release, ReleaseStatus, Track, TrackUpdate,
    TransitionAttempt,
};

// =============================================================================
// Release Store Trait (Infrastructure - the only shared mutable resource)
// =============================================================================

/// Durable record of releases and their tracks.
///
/// Every mutation is a single atomic check-and-set against the backing store.
/// Methods that return `bool` report whether the write applied; callers
/// decide what a `false` means.
#[async_trait]
pub trait BaseReleaseStore: Send + Sync {
    async fn get_release(&self, release_id: ReleaseId) -> Result<Option<Release>, StoreError>;

    /// Set status to `next` iff the current status equals `expected`
    /// (`None` sets unconditionally).
    async fn conditional_transition(
        &self,
        release_id: ReleaseId,
        expected: Option<ReleaseStatus>,
        next: ReleaseStatus,
    ) -> Result<bool, StoreError>;

    /// DRAFT -> PROCESSING, applied only while the release has tracks and
    /// every one of them has audio.
    async fn submit_transition(&self, release_id: ReleaseId) -> Result<bool, StoreError>;

    /// PENDING_REVIEW -> `next`, distinguishing a missing release from one
    /// in the wrong state.
    async fn review_transition(
        &self,
        release_id: ReleaseId,
        next: ReleaseStatus,
    ) -> Result<TransitionAttempt, StoreError>;

    /// Oldest `created_at` first, at most `limit` rows.
    async fn list_releases_by_status(
        &self,
        status: ReleaseStatus,
        limit: i64,
    ) -> Result<Vec<Release>, StoreError>;

    async fn track_completeness(
        &self,
        release_id: ReleaseId,
    ) -> Result<TrackCompleteness, StoreError>;

    // Draft editing -----------------------------------------------------------

    async fn create_release(&self, new: NewRelease) -> Result<Release, StoreError>;

    /// Newest first.
    async fn list_releases_for_artist(
        &self,
        artist_id: ArtistId,
    ) -> Result<Vec<Release>, StoreError>;

    /// Newest first.
    async fn list_releases(
        &self,
        status: Option<ReleaseStatus>,
    ) -> Result<Vec<Release>, StoreError>;

    async fn update_release_draft(
        &self,
        release_id: ReleaseId,
        title: &str,
        genre: &str,
    ) -> Result<bool, StoreError>;

    async fn set_cover_art(
        &self,
        release_id: ReleaseId,
        cover_art: AssetRef,
    ) -> Result<bool, StoreError>;

    /// `None` when the release is not DRAFT.
    async fn create_track(
        &self,
        release_id: ReleaseId,
        new: NewTrack,
    ) -> Result<Option<Track>, StoreError>;

    async fn list_tracks(&self, release_id: ReleaseId) -> Result<Vec<Track>, StoreError>;

    async fn update_track(
        &self,
        release_id: ReleaseId,
        track_id: TrackId,
        update: TrackUpdate,
    ) -> Result<bool, StoreError>;

    async fn delete_track(
        &self,
        release_id: ReleaseId,
        track_id: TrackId,
    ) -> Result<bool, StoreError>;

    async fn attach_track_audio(
        &self,
        release_id: ReleaseId,
        track_id: TrackId,
        audio: AssetRef,
    ) -> Result<bool, StoreError>;

    /// Cheap liveness probe for health checks.
    async fn ping(&self) -> Result<(), StoreError>;
}
