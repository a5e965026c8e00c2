use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::release::AssetRef;
use crate::common::{ReleaseId, TrackId};
use crate::domains::releases::completeness::TrackCompleteness;
use crate::domains::releases::errors::StoreError;

/// A single audio item belonging to a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub release_id: ReleaseId,
    pub title: String,
    pub isrc: String,
    pub duration_seconds: Option<i32>,
    pub audio: Option<AssetRef>,
    pub created_at: DateTime<Utc>,
}

impl Track {
    /// A track is complete once its audio has been uploaded.
    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct NewTrack {
    pub title: String,
    pub isrc: String,
    pub duration_seconds: Option<i32>,
}

/// Title is always replaced; ISRC and duration only when given.
#[derive(Debug, Clone)]
pub struct TrackUpdate {
    pub title: String,
    pub isrc: Option<String>,
    pub duration_seconds: Option<i32>,
}

#[derive(Debug, sqlx::FromRow)]
struct TrackRow {
    id: TrackId,
    release_id: ReleaseId,
    title: String,
    isrc: String,
    duration_seconds: Option<i32>,
    audio_object_key: Option<String>,
    audio_public_url: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<TrackRow> for Track {
    fn from(row: TrackRow) -> Self {
        Track {
            id: row.id,
            release_id: row.release_id,
            title: row.title,
            isrc: row.isrc,
            duration_seconds: row.duration_seconds,
            audio: row.audio_object_key.map(|object_key| AssetRef {
                object_key,
                public_url: row.audio_public_url,
            }),
            created_at: row.created_at,
        }
    }
}

// =============================================================================
// SQL Queries - every mutation is guarded by the parent release being DRAFT
// =============================================================================

impl Track {
    /// Returns `None` when the release is missing or no longer DRAFT.
    pub async fn create(
        release_id: ReleaseId,
        new: NewTrack,
        pool: &PgPool,
    ) -> Result<Option<Self>, StoreError> {
        let row = sqlx::query_as::<_, TrackRow>(
            r#"
            INSERT INTO tracks (id, release_id, title, isrc, duration_seconds)
            SELECT $1, r.id, $3, $4, $5
            FROM releases r
            WHERE r.id = $2
              AND r.status = 'DRAFT'
            RETURNING id, release_id, title, isrc, duration_seconds,
                      audio_object_key, audio_public_url, created_at
            "#,
        )
        .bind(TrackId::new())
        .bind(release_id)
        .bind(new.title)
        .bind(new.isrc)
        .bind(new.duration_seconds)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(Track::from))
    }

    pub async fn find_by_release(
        release_id: ReleaseId,
        pool: &PgPool,
    ) -> Result<Vec<Self>, StoreError> {
        let rows = sqlx::query_as::<_, TrackRow>(
            r#"
            SELECT id, release_id, title, isrc, duration_seconds,
                   audio_object_key, audio_public_url, created_at
            FROM tracks
            WHERE release_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(release_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(Track::from).collect())
    }

    pub async fn update(
        release_id: ReleaseId,
        track_id: TrackId,
        update: TrackUpdate,
        pool: &PgPool,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE tracks t
            SET title = $1,
                isrc = COALESCE($2, t.isrc),
                duration_seconds = COALESCE($3, t.duration_seconds)
            FROM releases r
            WHERE t.id = $4
              AND t.release_id = r.id
              AND r.id = $5
              AND r.status = 'DRAFT'
            "#,
        )
        .bind(update.title)
        .bind(update.isrc)
        .bind(update.duration_seconds)
        .bind(track_id)
        .bind(release_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(
        release_id: ReleaseId,
        track_id: TrackId,
        pool: &PgPool,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM tracks t
            USING releases r
            WHERE t.id = $1
              AND t.release_id = r.id
              AND r.id = $2
              AND r.status = 'DRAFT'
            "#,
        )
        .bind(track_id)
        .bind(release_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn attach_audio(
        release_id: ReleaseId,
        track_id: TrackId,
        audio: &AssetRef,
        pool: &PgPool,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE tracks t
            SET audio_object_key = $1,
                audio_public_url = $2
            FROM releases r
            WHERE t.id = $3
              AND t.release_id = r.id
              AND r.id = $4
              AND r.status = 'DRAFT'
            "#,
        )
        .bind(&audio.object_key)
        .bind(audio.public_url.as_deref())
        .bind(track_id)
        .bind(release_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts the current track set in one aggregate; never cached.
    pub async fn completeness(
        release_id: ReleaseId,
        pool: &PgPool,
    ) -> Result<TrackCompleteness, StoreError> {
        let (total, with_audio): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE audio_object_key IS NOT NULL) AS with_audio
            FROM tracks
            WHERE release_id = $1
            "#,
        )
        .bind(release_id)
        .fetch_one(pool)
        .await?;

        Ok(TrackCompleteness::from_counts(total, with_audio))
    }
}
