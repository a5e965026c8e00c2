use tracing::{debug, info, warn};

use crate::domains::releases::completeness::check_completeness;
use crate::domains::releases::errors::StoreError;
use crate::domains::releases::models::{Release, ReleaseStatus};
use crate::kernel::ServerDeps;

/// Counts from one promotion pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub scanned: usize,
    pub promoted: usize,
    /// Still waiting on tracks or audio.
    pub incomplete: usize,
    /// Moved by someone else between listing and the transition.
    pub raced: usize,
    pub failed: usize,
}

enum ItemResult {
    Promoted,
    Incomplete,
    Raced,
}

/// One pass over the PROCESSING queue: PROCESSING -> PENDING_REVIEW for every
/// release whose tracks are complete.
///
/// Only failing to list the queue fails the pass. Errors on a single release
/// are logged and the pass moves on; that release is retried next tick.
pub async fn promote_ready_releases_once(
    batch_size: i64,
    deps: &ServerDeps,
) -> Result<SweepReport, StoreError> {
    let batch = deps
        .store
        .list_releases_by_status(ReleaseStatus::Processing, batch_size)
        .await?;

    let mut report = SweepReport {
        scanned: batch.len(),
        ..Default::default()
    };

    for release in &batch {
        match promote_one(release, deps).await {
            Ok(ItemResult::Promoted) => report.promoted += 1,
            Ok(ItemResult::Incomplete) => report.incomplete += 1,
            Ok(ItemResult::Raced) => report.raced += 1,
            Err(e) => {
                warn!(release_id = %release.id, error = %e, "promotion failed, will retry next sweep");
                report.failed += 1;
            }
        }
    }

    if report.promoted > 0 || report.failed > 0 {
        info!(
            scanned = report.scanned,
            promoted = report.promoted,
            incomplete = report.incomplete,
            raced = report.raced,
            failed = report.failed,
            "promotion sweep finished"
        );
    }

    Ok(report)
}

async fn promote_one(release: &Release, deps: &ServerDeps) -> Result<ItemResult, StoreError> {
    let completeness = check_completeness(release.id, deps).await?;
    if let Some(missing) = completeness.missing() {
        // Track writes stop at DRAFT, so only a late storage callback can
        // still complete this release.
        warn!(release_id = %release.id, missing, "processing release is incomplete");
        return Ok(ItemResult::Incomplete);
    }

    let applied = deps
        .store
        .conditional_transition(
            release.id,
            Some(ReleaseStatus::Processing),
            ReleaseStatus::PendingReview,
        )
        .await?;

    if applied {
        info!(release_id = %release.id, "release ready for review");
        Ok(ItemResult::Promoted)
    } else {
        debug!(release_id = %release.id, "release already moved, skipping");
        Ok(ItemResult::Raced)
    }
}
