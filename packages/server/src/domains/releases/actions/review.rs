use serde::{Deserialize, Serialize};
use tracing::info;

use crate::common::{Actor, ReleaseId, Role};
use crate::domains::releases::errors::ReleaseError;
use crate::domains::releases::models::{Release, ReleaseStatus, TransitionAttempt};
use crate::kernel::ServerDeps;

/// Upper bound on the review queue returned in one listing.
pub const REVIEW_QUEUE_LIMIT: i64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl ReviewDecision {
    pub fn target_status(&self) -> ReleaseStatus {
        match self {
            ReviewDecision::Approve => ReleaseStatus::Published,
            ReviewDecision::Reject => ReleaseStatus::Rejected,
        }
    }
}

/// PENDING_REVIEW -> PUBLISHED | REJECTED.
///
/// Not idempotent: reviewing a release that is not pending review (already
/// reviewed, or still in an earlier state) is an `InvalidState` error.
pub async fn review_release(
    release_id: ReleaseId,
    decision: ReviewDecision,
    actor: &Actor,
    deps: &ServerDeps,
) -> Result<ReleaseStatus, ReleaseError> {
    actor.require(Role::Admin)?;

    let target = decision.target_status();
    match deps.store.review_transition(release_id, target).await? {
        TransitionAttempt::NotFound => Err(ReleaseError::NotFound),
        TransitionAttempt::Rejected => Err(ReleaseError::InvalidState(
            "release is not pending review".to_string(),
        )),
        TransitionAttempt::Applied => {
            info!(release_id = %release_id, reviewed_by = %actor.user_id, status = %target, "release reviewed");
            Ok(target)
        }
    }
}

pub async fn approve_release(
    release_id: ReleaseId,
    actor: &Actor,
    deps: &ServerDeps,
) -> Result<ReleaseStatus, ReleaseError> {
    review_release(release_id, ReviewDecision::Approve, actor, deps).await
}

pub async fn reject_release(
    release_id: ReleaseId,
    actor: &Actor,
    deps: &ServerDeps,
) -> Result<ReleaseStatus, ReleaseError> {
    review_release(release_id, ReviewDecision::Reject, actor, deps).await
}

/// The review queue, oldest first.
pub async fn list_pending_review(
    actor: &Actor,
    deps: &ServerDeps,
) -> Result<Vec<Release>, ReleaseError> {
    actor.require(Role::Admin)?;

    Ok(deps
        .store
        .list_releases_by_status(ReleaseStatus::PendingReview, REVIEW_QUEUE_LIMIT)
        .await?)
}

/// Every release, optionally filtered by status, newest first.
pub async fn list_releases_admin(
    status: Option<ReleaseStatus>,
    actor: &Actor,
    deps: &ServerDeps,
) -> Result<Vec<Release>, ReleaseError> {
    actor.require(Role::Admin)?;

    Ok(deps.store.list_releases(status).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::UserId;
    use crate::kernel::{BaseReleaseStore, Interleaved, TestDependencies};

    async fn pending_release(test: &TestDependencies) -> Release {
        let release = test.draft_release(UserId::new()).await;
        test.store
            .conditional_transition(release.id, None, ReleaseStatus::PendingReview)
            .await
            .unwrap();
        release
    }

    #[tokio::test]
    async fn test_approve_then_second_approve_fails() {
        let test = TestDependencies::new();
        let admin = Actor::admin(UserId::new());
        let release = pending_release(&test).await;

        let status = review_release(release.id, ReviewDecision::Approve, &admin, &test.deps)
            .await
            .unwrap();
        assert_eq!(status, ReleaseStatus::Published);

        let again = review_release(release.id, ReviewDecision::Approve, &admin, &test.deps).await;
        assert!(matches!(again, Err(ReleaseError::InvalidState(_))));
        assert_eq!(
            test.store.status_of(release.id),
            Some(ReleaseStatus::Published)
        );
    }

    #[tokio::test]
    async fn test_approving_draft_fails_with_invalid_state() {
        let test = TestDependencies::new();
        let admin = Actor::admin(UserId::new());
        let release = test.draft_release(UserId::new()).await;

        let result = review_release(release.id, ReviewDecision::Approve, &admin, &test.deps).await;
        assert!(matches!(result, Err(ReleaseError::InvalidState(_))));
        assert_eq!(test.store.status_of(release.id), Some(ReleaseStatus::Draft));
    }

    #[tokio::test]
    async fn test_reject_is_terminal() {
        let test = TestDependencies::new();
        let admin = Actor::admin(UserId::new());
        let release = pending_release(&test).await;

        review_release(release.id, ReviewDecision::Reject, &admin, &test.deps)
            .await
            .unwrap();
        let approve = review_release(release.id, ReviewDecision::Approve, &admin, &test.deps).await;
        assert!(matches!(approve, Err(ReleaseError::InvalidState(_))));
        assert_eq!(test.store.status_of(release.id), Some(ReleaseStatus::Rejected));
    }

    #[tokio::test]
    async fn test_concurrent_reviews_first_decision_wins() {
        let test = TestDependencies::new();
        let admin = Actor::admin(UserId::new());
        let release = pending_release(&test).await;
        test.store.interleave_before_transition(
            release.id,
            Interleaved::Status(ReleaseStatus::Rejected),
        );

        let approve = approve_release(release.id, &admin, &test.deps).await;

        assert!(matches!(approve, Err(ReleaseError::InvalidState(_))));
        assert_eq!(test.store.status_of(release.id), Some(ReleaseStatus::Rejected));
    }

    #[tokio::test]
    async fn test_missing_release_is_not_found() {
        let test = TestDependencies::new();
        let admin = Actor::admin(UserId::new());

        let result =
            review_release(ReleaseId::new(), ReviewDecision::Reject, &admin, &test.deps).await;
        assert!(matches!(result, Err(ReleaseError::NotFound)));
    }

    #[tokio::test]
    async fn test_artist_cannot_review() {
        let test = TestDependencies::new();
        let release = pending_release(&test).await;

        let result = review_release(
            release.id,
            ReviewDecision::Approve,
            &Actor::artist(release.artist_id),
            &test.deps,
        )
        .await;
        assert!(matches!(result, Err(ReleaseError::Forbidden(_))));
        assert_eq!(
            test.store.status_of(release.id),
            Some(ReleaseStatus::PendingReview)
        );
    }

    #[tokio::test]
    async fn test_pending_queue_is_oldest_first() {
        let test = TestDependencies::new();
        let admin = Actor::admin(UserId::new());
        let first = pending_release(&test).await;
        let _draft = test.draft_release(UserId::new()).await;
        let second = pending_release(&test).await;

        let queue = list_pending_review(&admin, &test.deps).await.unwrap();
        let ids: Vec<ReleaseId> = queue.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }
}
