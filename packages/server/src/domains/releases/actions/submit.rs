use serde::Serialize;
use tracing::{debug, info};

use super::access::find_release_for_actor;
use crate::common::{Actor, ArtistId, ReleaseId};
use crate::domains::releases::completeness::check_completeness;
use crate::domains::releases::errors::ReleaseError;
use crate::domains::releases::models::ReleaseStatus;
use crate::kernel::ServerDeps;

/// What a successful submit call did.
///
/// The UI starts polling on `ProcessingStarted` and `AlreadyProcessing`, so
/// the three cases stay distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitOutcome {
    ProcessingStarted,
    AlreadyProcessing,
    AlreadySubmitted,
}

impl SubmitOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmitOutcome::ProcessingStarted => "processing_started",
            SubmitOutcome::AlreadyProcessing => "already_processing",
            SubmitOutcome::AlreadySubmitted => "already_submitted",
        }
    }

    /// Outcome for a release that has already left DRAFT.
    fn for_settled(status: ReleaseStatus) -> Option<Self> {
        match status {
            ReleaseStatus::Draft => None,
            ReleaseStatus::Processing => Some(SubmitOutcome::AlreadyProcessing),
            ReleaseStatus::PendingReview | ReleaseStatus::Published | ReleaseStatus::Rejected => {
                Some(SubmitOutcome::AlreadySubmitted)
            }
        }
    }
}

/// Submit a DRAFT release: DRAFT -> PROCESSING.
///
/// Repeat calls after the release has left DRAFT succeed without effect.
/// When two submissions race, the store lets exactly one transition apply;
/// the loser re-reads the release and reports it as already processing.
/// The store re-checks the track set in the transition itself, so a track
/// removed after the completeness check keeps the release in DRAFT.
pub async fn submit_release(
    release_id: ReleaseId,
    artist_id: ArtistId,
    deps: &ServerDeps,
) -> Result<SubmitOutcome, ReleaseError> {
    let actor = Actor::artist(artist_id);
    let release = find_release_for_actor(release_id, &actor, deps).await?;

    if let Some(outcome) = SubmitOutcome::for_settled(release.status) {
        debug!(release_id = %release_id, status = %release.status, outcome = outcome.as_str(), "submit is a no-op");
        return Ok(outcome);
    }

    ensure_complete(release_id, deps).await?;

    if deps.store.submit_transition(release_id).await? {
        info!(release_id = %release_id, artist_id = %artist_id, "release submitted for processing");
        deps.promotion.notify();
        return Ok(SubmitOutcome::ProcessingStarted);
    }

    // Lost a race: either someone else moved it first or its tracks changed.
    let current = find_release_for_actor(release_id, &actor, deps).await?;
    if let Some(outcome) = SubmitOutcome::for_settled(current.status) {
        debug!(release_id = %release_id, status = %current.status, "submit lost the race");
        return Ok(outcome);
    }
    ensure_complete(release_id, deps).await?;
    Err(ReleaseError::InvalidState(
        "release changed during submission, retry".to_string(),
    ))
}

async fn ensure_complete(release_id: ReleaseId, deps: &ServerDeps) -> Result<(), ReleaseError> {
    let completeness = check_completeness(release_id, deps).await?;
    match completeness.missing() {
        Some(missing) => Err(ReleaseError::InvalidState(missing.to_string())),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::UserId;
    use crate::kernel::{BaseReleaseStore, Interleaved, TestDependencies};

    #[tokio::test]
    async fn test_submit_requires_tracks_with_audio() {
        let test = TestDependencies::new();
        let artist = UserId::new();
        let release = test.draft_release(artist).await;

        let no_tracks = submit_release(release.id, artist, &test.deps).await;
        assert!(matches!(no_tracks, Err(ReleaseError::InvalidState(_))));

        let track = test.add_track(release.id, false).await;
        let no_audio = submit_release(release.id, artist, &test.deps).await;
        assert!(matches!(no_audio, Err(ReleaseError::InvalidState(_))));
        assert_eq!(test.store.status_of(release.id), Some(ReleaseStatus::Draft));

        test.attach_audio(release.id, track.id).await;
        let outcome = submit_release(release.id, artist, &test.deps).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::ProcessingStarted);
        assert_eq!(
            test.store.status_of(release.id),
            Some(ReleaseStatus::Processing)
        );
    }

    #[tokio::test]
    async fn test_second_submit_reports_already_processing() {
        let test = TestDependencies::new();
        let artist = UserId::new();
        let release = test.draft_release(artist).await;
        test.add_track(release.id, true).await;

        let first = submit_release(release.id, artist, &test.deps).await.unwrap();
        let second = submit_release(release.id, artist, &test.deps).await.unwrap();

        assert_eq!(first, SubmitOutcome::ProcessingStarted);
        assert_eq!(second, SubmitOutcome::AlreadyProcessing);
        assert_eq!(test.store.applied_transitions().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_submits_apply_exactly_once() {
        let test = TestDependencies::new();
        let artist = UserId::new();
        let release = test.draft_release(artist).await;
        test.add_track(release.id, true).await;

        let (a, b) = tokio::join!(
            submit_release(release.id, artist, &test.deps),
            submit_release(release.id, artist, &test.deps),
        );

        let mut outcomes = vec![a.unwrap(), b.unwrap()];
        outcomes.sort_by_key(|o| o.as_str());
        assert_eq!(
            outcomes,
            vec![
                SubmitOutcome::AlreadyProcessing,
                SubmitOutcome::ProcessingStarted
            ]
        );
        assert_eq!(test.store.applied_transitions().len(), 1);
    }

    #[tokio::test]
    async fn test_submit_losing_race_reports_already_processing() {
        let test = TestDependencies::new();
        let artist = UserId::new();
        let release = test.draft_release(artist).await;
        test.add_track(release.id, true).await;
        test.store.interleave_before_transition(
            release.id,
            Interleaved::Status(ReleaseStatus::Processing),
        );

        let outcome = submit_release(release.id, artist, &test.deps).await.unwrap();

        assert_eq!(outcome, SubmitOutcome::AlreadyProcessing);
        assert_eq!(test.store.applied_transitions().len(), 1);
    }

    #[tokio::test]
    async fn test_tracks_removed_mid_submit_keep_release_in_draft() {
        let test = TestDependencies::new();
        let artist = UserId::new();
        let release = test.draft_release(artist).await;
        test.add_track(release.id, true).await;
        test.store
            .interleave_before_transition(release.id, Interleaved::ClearTracks);

        let result = submit_release(release.id, artist, &test.deps).await;

        assert!(matches!(result, Err(ReleaseError::InvalidState(_))));
        assert_eq!(test.store.status_of(release.id), Some(ReleaseStatus::Draft));
        assert!(test.store.applied_transitions().is_empty());
    }

    #[tokio::test]
    async fn test_submit_after_review_reports_already_submitted() {
        let test = TestDependencies::new();
        let artist = UserId::new();
        let release = test.draft_release(artist).await;

        for status in [ReleaseStatus::PendingReview, ReleaseStatus::Rejected] {
            test.store
                .conditional_transition(release.id, None, status)
                .await
                .unwrap();
            let outcome = submit_release(release.id, artist, &test.deps).await.unwrap();
            assert_eq!(outcome, SubmitOutcome::AlreadySubmitted);
        }
    }

    #[tokio::test]
    async fn test_submit_hides_other_artists_release() {
        let test = TestDependencies::new();
        let release = test.draft_release(UserId::new()).await;
        test.add_track(release.id, true).await;

        let result = submit_release(release.id, UserId::new(), &test.deps).await;
        assert!(matches!(result, Err(ReleaseError::NotFound)));
        assert_eq!(test.store.status_of(release.id), Some(ReleaseStatus::Draft));
    }

    #[test]
    fn test_outcome_strings() {
        assert_eq!(
            serde_json::to_value(SubmitOutcome::ProcessingStarted).unwrap(),
            serde_json::json!("processing_started")
        );
        assert_eq!(SubmitOutcome::AlreadyProcessing.as_str(), "already_processing");
        assert_eq!(SubmitOutcome::AlreadySubmitted.as_str(), "already_submitted");
    }
}
