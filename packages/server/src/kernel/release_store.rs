//! PostgreSQL-backed release store.
//!
//! Thin adapter from [`BaseReleaseStore`] onto the model queries. Every call
//! is bounded by `op_timeout`; a timeout surfaces as [`StoreError::Timeout`]
//! and the write may or may not have landed.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;

use super::BaseReleaseStore;
use crate::common::{ArtistId, ReleaseId, TrackId};
use crate::domains::releases::completeness::TrackCompleteness;
use crate::domains::releases::errors::StoreError;
use crate::domains::releases::models::{
    AssetRef, NewRelease, NewTrack, Release, ReleaseStatus, Track, TrackUpdate,
    TransitionAttempt,
};

pub struct PostgresReleaseStore {
    pool: PgPool,
    op_timeout: Duration,
}

impl PostgresReleaseStore {
    pub fn new(pool: PgPool, op_timeout: Duration) -> Self {
        Self { pool, op_timeout }
    }

    async fn bounded<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        tokio::time::timeout(self.op_timeout, op)
            .await
            .map_err(|_| StoreError::Timeout(self.op_timeout))?
    }
}

#[async_trait]
impl BaseReleaseStore for PostgresReleaseStore {
    async fn get_release(&self, release_id: ReleaseId) -> Result<Option<Release>, StoreError> {
        self.bounded(Release::find_by_id(release_id, &self.pool))
            .await
    }

    async fn conditional_transition(
        &self,
        release_id: ReleaseId,
        expected: Option<ReleaseStatus>,
        next: ReleaseStatus,
    ) -> Result<bool, StoreError> {
        self.bounded(Release::transition(release_id, expected, next, &self.pool))
            .await
    }

    async fn submit_transition(&self, release_id: ReleaseId) -> Result<bool, StoreError> {
        self.bounded(Release::submit(release_id, &self.pool)).await
    }

    async fn review_transition(
        &self,
        release_id: ReleaseId,
        next: ReleaseStatus,
    ) -> Result<TransitionAttempt, StoreError> {
        self.bounded(Release::review(release_id, next, &self.pool))
            .await
    }

    async fn list_releases_by_status(
        &self,
        status: ReleaseStatus,
        limit: i64,
    ) -> Result<Vec<Release>, StoreError> {
        self.bounded(Release::find_by_status(status, limit, &self.pool))
            .await
    }

    async fn track_completeness(
        &self,
        release_id: ReleaseId,
    ) -> Result<TrackCompleteness, StoreError> {
        self.bounded(Track::completeness(release_id, &self.pool))
            .await
    }

    async fn create_release(&self, new: NewRelease) -> Result<Release, StoreError> {
        self.bounded(Release::create(new, &self.pool)).await
    }

    async fn list_releases_for_artist(
        &self,
        artist_id: ArtistId,
    ) -> Result<Vec<Release>, StoreError> {
        self.bounded(Release::find_by_artist(artist_id, &self.pool))
            .await
    }

    async fn list_releases(
        &self,
        status: Option<ReleaseStatus>,
    ) -> Result<Vec<Release>, StoreError> {
        self.bounded(Release::find_all(status, &self.pool)).await
    }

    async fn update_release_draft(
        &self,
        release_id: ReleaseId,
        title: &str,
        genre: &str,
    ) -> Result<bool, StoreError> {
        self.bounded(Release::update_draft(release_id, title, genre, &self.pool))
            .await
    }

    async fn set_cover_art(
        &self,
        release_id: ReleaseId,
        cover_art: AssetRef,
    ) -> Result<bool, StoreError> {
        self.bounded(Release::set_cover_art(release_id, &cover_art, &self.pool))
            .await
    }

    async fn create_track(
        &self,
        release_id: ReleaseId,
        new: NewTrack,
    ) -> Result<Option<Track>, StoreError> {
        self.bounded(Track::create(release_id, new, &self.pool))
            .await
    }

    async fn list_tracks(&self, release_id: ReleaseId) -> Result<Vec<Track>, StoreError> {
        self.bounded(Track::find_by_release(release_id, &self.pool))
            .await
    }

    async fn update_track(
        &self,
        release_id: ReleaseId,
        track_id: TrackId,
        update: TrackUpdate,
    ) -> Result<bool, StoreError> {
        self.bounded(Track::update(release_id, track_id, update, &self.pool))
            .await
    }

    async fn delete_track(
        &self,
        release_id: ReleaseId,
        track_id: TrackId,
    ) -> Result<bool, StoreError> {
        self.bounded(Track::delete(release_id, track_id, &self.pool))
            .await
    }

    async fn attach_track_audio(
        &self,
        release_id: ReleaseId,
        track_id: TrackId,
        audio: AssetRef,
    ) -> Result<bool, StoreError> {
        self.bounded(Track::attach_audio(release_id, track_id, &audio, &self.pool))
            .await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.bounded(async {
            sqlx::query("SELECT 1").execute(&self.pool).await?;
            Ok(())
        })
        .await
    }
}
