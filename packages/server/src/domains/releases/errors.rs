use std::time::Duration;

use thiserror::Error;

use crate::common::AuthError;

/// Failures at the persistence seam.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// The operation did not finish in time; its outcome is unknown.
    #[error("Store operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.kind() {
                sqlx::error::ErrorKind::UniqueViolation => {
                    return StoreError::Conflict(
                        db_err.constraint().unwrap_or("unique").to_string(),
                    );
                }
                sqlx::error::ErrorKind::CheckViolation => {
                    return StoreError::InvalidData(db_err.message().to_string());
                }
                _ => {}
            }
        }
        StoreError::Database(err)
    }
}

/// Failures surfaced by release lifecycle operations.
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Absent, or present but not visible to the caller.
    #[error("Release not found")]
    NotFound,

    #[error("Track not found")]
    TrackNotFound,

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error(transparent)]
    Forbidden(#[from] AuthError),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// I/O failure; retrying is safe.
    #[error("Transient store error: {0}")]
    TransientStore(StoreError),
}

impl From<StoreError> for ReleaseError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(constraint) if constraint == "tracks_isrc_unique" => {
                ReleaseError::Conflict("ISRC already exists".to_string())
            }
            StoreError::Conflict(constraint) => ReleaseError::Conflict(constraint),
            StoreError::InvalidData(message) => ReleaseError::Validation(message),
            other => ReleaseError::TransientStore(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isrc_conflict_maps_to_readable_message() {
        let err = ReleaseError::from(StoreError::Conflict("tracks_isrc_unique".to_string()));
        assert!(matches!(err, ReleaseError::Conflict(msg) if msg == "ISRC already exists"));
    }

    #[test]
    fn test_timeout_is_transient() {
        let err = ReleaseError::from(StoreError::Timeout(Duration::from_secs(5)));
        assert!(matches!(err, ReleaseError::TransientStore(StoreError::Timeout(_))));
    }
}
