use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{ArtistId, ReleaseId};
use crate::domains::releases::errors::StoreError;

/// A release: the unit an artist submits and an admin reviews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub id: ReleaseId,
    pub artist_id: ArtistId,
    pub title: String,
    pub genre: String,
    pub status: ReleaseStatus,
    pub cover_art: Option<AssetRef>,
    pub created_at: DateTime<Utc>,
}

/// Reference to an uploaded object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRef {
    pub object_key: String,
    pub public_url: Option<String>,
}

/// Release lifecycle status
///
/// ```text
/// DRAFT ─► PROCESSING ─► PENDING_REVIEW ─┬─► PUBLISHED
///                                        └─► REJECTED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReleaseStatus {
    Draft,
    Processing,
    PendingReview,
    Published,
    Rejected,
}

impl ReleaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseStatus::Draft => "DRAFT",
            ReleaseStatus::Processing => "PROCESSING",
            ReleaseStatus::PendingReview => "PENDING_REVIEW",
            ReleaseStatus::Published => "PUBLISHED",
            ReleaseStatus::Rejected => "REJECTED",
        }
    }

    /// Whether `next` is a legal single step from `self`.
    pub fn can_transition_to(&self, next: ReleaseStatus) -> bool {
        matches!(
            (self, next),
            (ReleaseStatus::Draft, ReleaseStatus::Processing)
                | (ReleaseStatus::Processing, ReleaseStatus::PendingReview)
                | (ReleaseStatus::PendingReview, ReleaseStatus::Published)
                | (ReleaseStatus::PendingReview, ReleaseStatus::Rejected)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ReleaseStatus::Published | ReleaseStatus::Rejected)
    }
}

impl std::fmt::Display for ReleaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReleaseStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "DRAFT" => Ok(ReleaseStatus::Draft),
            "PROCESSING" => Ok(ReleaseStatus::Processing),
            "PENDING_REVIEW" => Ok(ReleaseStatus::PendingReview),
            "PUBLISHED" => Ok(ReleaseStatus::Published),
            "REJECTED" => Ok(ReleaseStatus::Rejected),
            _ => Err(anyhow::anyhow!("Invalid release status: {}", s)),
        }
    }
}

/// Outcome of a review transition attempted in a single statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionAttempt {
    NotFound,
    Applied,
    /// The release exists but was not in the expected state.
    Rejected,
}

/// Fields for a new draft.
#[derive(Debug, Clone)]
pub struct NewRelease {
    pub artist_id: ArtistId,
    pub title: String,
    pub genre: String,
}

#[derive(Debug, sqlx::FromRow)]
struct ReleaseRow {
    id: ReleaseId,
    artist_id: ArtistId,
    title: String,
    genre: String,
    status: String,
    cover_art_object_key: Option<String>,
    cover_art_public_url: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReleaseRow> for Release {
    type Error = StoreError;

    fn try_from(row: ReleaseRow) -> Result<Self, StoreError> {
        let status = row
            .status
            .parse()
            .map_err(|e: anyhow::Error| StoreError::InvalidData(e.to_string()))?;

        Ok(Release {
            id: row.id,
            artist_id: row.artist_id,
            title: row.title,
            genre: row.genre,
            status,
            cover_art: row.cover_art_object_key.map(|object_key| AssetRef {
                object_key,
                public_url: row.cover_art_public_url,
            }),
            created_at: row.created_at,
        })
    }
}

fn into_releases(rows: Vec<ReleaseRow>) -> Result<Vec<Release>, StoreError> {
    rows.into_iter().map(Release::try_from).collect()
}

const RELEASE_COLUMNS: &str =
    "id, artist_id, title, genre, status, cover_art_object_key, cover_art_public_url, created_at";

// =============================================================================
// SQL Queries - all release queries live here
// =============================================================================

impl Release {
    pub async fn find_by_id(id: ReleaseId, pool: &PgPool) -> Result<Option<Self>, StoreError> {
        let row = sqlx::query_as::<_, ReleaseRow>(&format!(
            "SELECT {RELEASE_COLUMNS} FROM releases WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        row.map(Release::try_from).transpose()
    }

    pub async fn create(new: NewRelease, pool: &PgPool) -> Result<Self, StoreError> {
        let row = sqlx::query_as::<_, ReleaseRow>(&format!(
            r#"
            INSERT INTO releases (id, artist_id, title, genre, status)
            VALUES ($1, $2, $3, $4, 'DRAFT')
            RETURNING {RELEASE_COLUMNS}
            "#
        ))
        .bind(ReleaseId::new())
        .bind(new.artist_id)
        .bind(new.title)
        .bind(new.genre)
        .fetch_one(pool)
        .await?;

        row.try_into()
    }

    /// Newest first.
    pub async fn find_by_artist(
        artist_id: ArtistId,
        pool: &PgPool,
    ) -> Result<Vec<Self>, StoreError> {
        let rows = sqlx::query_as::<_, ReleaseRow>(&format!(
            r#"
            SELECT {RELEASE_COLUMNS}
            FROM releases
            WHERE artist_id = $1
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(artist_id)
        .fetch_all(pool)
        .await?;

        into_releases(rows)
    }

    /// All releases, optionally filtered by status, newest first.
    pub async fn find_all(
        status: Option<ReleaseStatus>,
        pool: &PgPool,
    ) -> Result<Vec<Self>, StoreError> {
        let rows = sqlx::query_as::<_, ReleaseRow>(&format!(
            r#"
            SELECT {RELEASE_COLUMNS}
            FROM releases
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(status.map(|s| s.as_str()))
        .fetch_all(pool)
        .await?;

        into_releases(rows)
    }

    /// Oldest first, bounded.
    pub async fn find_by_status(
        status: ReleaseStatus,
        limit: i64,
        pool: &PgPool,
    ) -> Result<Vec<Self>, StoreError> {
        let rows = sqlx::query_as::<_, ReleaseRow>(&format!(
            r#"
            SELECT {RELEASE_COLUMNS}
            FROM releases
            WHERE status = $1
            ORDER BY created_at ASC, id ASC
            LIMIT $2
            "#
        ))
        .bind(status.as_str())
        .bind(limit)
        .fetch_all(pool)
        .await?;

        into_releases(rows)
    }

    /// Atomic check-and-set on status. `expected = None` sets unconditionally.
    pub async fn transition(
        id: ReleaseId,
        expected: Option<ReleaseStatus>,
        next: ReleaseStatus,
        pool: &PgPool,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE releases
            SET status = $1
            WHERE id = $2
              AND ($3::text IS NULL OR status = $3)
            "#,
        )
        .bind(next.as_str())
        .bind(id)
        .bind(expected.map(|s| s.as_str()))
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// DRAFT -> PROCESSING, re-checking the track set in the same statement.
    pub async fn submit(id: ReleaseId, pool: &PgPool) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE releases r
            SET status = 'PROCESSING'
            WHERE r.id = $1
              AND r.status = 'DRAFT'
              AND EXISTS (SELECT 1 FROM tracks t WHERE t.release_id = r.id)
              AND NOT EXISTS (
                  SELECT 1 FROM tracks t
                  WHERE t.release_id = r.id
                    AND t.audio_object_key IS NULL
              )
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// PENDING_REVIEW -> `next`, reporting existence in the same statement.
    pub async fn review(
        id: ReleaseId,
        next: ReleaseStatus,
        pool: &PgPool,
    ) -> Result<TransitionAttempt, StoreError> {
        let (found, applied): (bool, bool) = sqlx::query_as(
            r#"
            WITH target AS (
                SELECT 1 FROM releases WHERE id = $1
            ),
            updated AS (
                UPDATE releases
                SET status = $2
                WHERE id = $1
                  AND status = 'PENDING_REVIEW'
                RETURNING 1
            )
            SELECT
                EXISTS (SELECT 1 FROM target) AS found,
                EXISTS (SELECT 1 FROM updated) AS applied
            "#,
        )
        .bind(id)
        .bind(next.as_str())
        .fetch_one(pool)
        .await?;

        Ok(match (found, applied) {
            (false, _) => TransitionAttempt::NotFound,
            (true, true) => TransitionAttempt::Applied,
            (true, false) => TransitionAttempt::Rejected,
        })
    }

    /// Only while DRAFT.
    pub async fn update_draft(
        id: ReleaseId,
        title: &str,
        genre: &str,
        pool: &PgPool,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE releases
            SET title = $1,
                genre = $2
            WHERE id = $3
              AND status = 'DRAFT'
            "#,
        )
        .bind(title)
        .bind(genre)
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Only while DRAFT.
    pub async fn set_cover_art(
        id: ReleaseId,
        cover_art: &AssetRef,
        pool: &PgPool,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE releases
            SET cover_art_object_key = $1,
                cover_art_public_url = $2
            WHERE id = $3
              AND status = 'DRAFT'
            "#,
        )
        .bind(&cover_art.object_key)
        .bind(cover_art.public_url.as_deref())
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
