//! Track completeness: whether every track of a release has audio attached.
//!
//! Both the submission transition and the promotion sweep ask this question
//! right before acting, and always against the persisted track set.

use serde::Serialize;

use crate::common::ReleaseId;
use crate::domains::releases::errors::StoreError;
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrackCompleteness {
    pub has_any_tracks: bool,
    pub all_have_audio: bool,
}

impl TrackCompleteness {
    /// Zero tracks never counts as "all have audio".
    pub fn from_counts(total: i64, with_audio: i64) -> Self {
        Self {
            has_any_tracks: total > 0,
            all_have_audio: total > 0 && total == with_audio,
        }
    }

    /// Submittable / promotable.
    pub fn is_ready(&self) -> bool {
        self.has_any_tracks && self.all_have_audio
    }

    /// Human-readable reason the release is not ready, if any.
    pub fn missing(&self) -> Option<&'static str> {
        if !self.has_any_tracks {
            Some("release has no tracks")
        } else if !self.all_have_audio {
            Some("not every track has audio")
        } else {
            None
        }
    }
}

pub async fn check_completeness(
    release_id: ReleaseId,
    deps: &ServerDeps,
) -> Result<TrackCompleteness, StoreError> {
    deps.store.track_completeness(release_id).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_tracks_is_not_ready() {
        let c = TrackCompleteness::from_counts(0, 0);
        assert!(!c.has_any_tracks);
        assert!(!c.all_have_audio);
        assert_eq!(c.missing(), Some("release has no tracks"));
    }

    #[test]
    fn test_partial_audio_is_not_ready() {
        let c = TrackCompleteness::from_counts(3, 2);
        assert!(c.has_any_tracks);
        assert!(!c.is_ready());
        assert_eq!(c.missing(), Some("not every track has audio"));
    }

    #[test]
    fn test_all_audio_is_ready() {
        let c = TrackCompleteness::from_counts(2, 2);
        assert!(c.is_ready());
        assert_eq!(c.missing(), None);
    }
}
