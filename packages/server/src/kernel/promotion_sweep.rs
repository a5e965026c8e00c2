//! Background loop that advances PROCESSING releases to PENDING_REVIEW.
//!
//! The loop is a stateless poll over a bounded query:
//!
//! ```text
//! PromotionSweep
//!     │
//!     ├─► wait: interval elapsed | PromotionSignal | shutdown
//!     └─► promote_ready_releases_once(batch_size)
//!             ├─► list PROCESSING, oldest first
//!             ├─► check completeness per release
//!             └─► conditional PROCESSING -> PENDING_REVIEW
//! ```
//!
//! A pass runs right at startup, so releases left PROCESSING by a previous
//! process are picked up without any persisted queue. The signal only
//! shortens the wait after a submission; the periodic scan stays the
//! backstop.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::domains::releases::actions::promote_ready_releases_once;
use crate::kernel::ServerDeps;

/// Wakes the sweep before its interval elapses.
///
/// A notification sent while the sweep is busy is kept, so the following
/// wait returns immediately.
#[derive(Clone, Default)]
pub struct PromotionSignal {
    notify: Arc<Notify>,
}

impl PromotionSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(&self) {
        self.notify.notify_one();
    }

    pub async fn notified(&self) {
        self.notify.notified().await
    }
}

/// Configuration for the promotion sweep.
#[derive(Debug, Clone)]
pub struct PromotionSweepConfig {
    /// Time between passes when nothing wakes the sweep early
    pub interval: Duration,
    /// Maximum releases examined per pass
    pub batch_size: i64,
}

impl Default for PromotionSweepConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            batch_size: 50,
        }
    }
}

pub struct PromotionSweep {
    deps: ServerDeps,
    config: PromotionSweepConfig,
}

impl PromotionSweep {
    pub fn new(deps: ServerDeps, config: PromotionSweepConfig) -> Self {
        Self { deps, config }
    }

    /// Run on the current runtime until `shutdown` is cancelled.
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<Result<()>> {
        tokio::spawn(self.run(shutdown))
    }

    pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
        info!(
            interval_ms = self.config.interval.as_millis() as u64,
            batch_size = self.config.batch_size,
            "promotion sweep starting"
        );

        loop {
            // An interrupted pass is safe: every transition is conditional.
            tokio::select! {
                _ = shutdown.cancelled() => break,
                result = promote_ready_releases_once(self.config.batch_size, &self.deps) => {
                    match result {
                        Ok(report) => debug!(scanned = report.scanned, promoted = report.promoted, "sweep pass done"),
                        Err(e) => error!(error = %e, "failed to list processing releases"),
                    }
                }
            }

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.config.interval) => {}
                _ = self.deps.promotion.notified() => {
                    debug!("promotion sweep woken by submission");
                }
            }
        }

        info!("promotion sweep stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::UserId;
    use crate::domains::releases::actions::submit_release;
    use crate::domains::releases::models::ReleaseStatus;
    use crate::kernel::TestDependencies;

    async fn wait_for_status(
        test: &TestDependencies,
        release_id: crate::common::ReleaseId,
        status: ReleaseStatus,
    ) -> bool {
        for _ in 0..100 {
            if test.store.status_of(release_id) == Some(status) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    #[test]
    fn test_config_defaults() {
        let config = PromotionSweepConfig::default();
        assert_eq!(config.interval, Duration::from_secs(5));
        assert_eq!(config.batch_size, 50);
    }

    #[tokio::test]
    async fn test_periodic_pass_promotes_release() {
        let test = TestDependencies::new();
        let artist = UserId::new();
        let release = test.draft_release(artist).await;
        test.add_track(release.id, true).await;
        submit_release(release.id, artist, &test.deps).await.unwrap();

        let shutdown = CancellationToken::new();
        let handle = PromotionSweep::new(
            test.deps.clone(),
            PromotionSweepConfig {
                interval: Duration::from_millis(20),
                batch_size: 10,
            },
        )
        .spawn(shutdown.clone());

        assert!(wait_for_status(&test, release.id, ReleaseStatus::PendingReview).await);

        shutdown.cancel();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_submission_wakes_sweep_early() {
        let test = TestDependencies::new();
        let shutdown = CancellationToken::new();
        let handle = PromotionSweep::new(
            test.deps.clone(),
            PromotionSweepConfig {
                interval: Duration::from_secs(3600),
                batch_size: 10,
            },
        )
        .spawn(shutdown.clone());

        let artist = UserId::new();
        let release = test.draft_release(artist).await;
        test.add_track(release.id, true).await;
        submit_release(release.id, artist, &test.deps).await.unwrap();

        assert!(wait_for_status(&test, release.id, ReleaseStatus::PendingReview).await);

        shutdown.cancel();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_cancelled_sweep_exits() {
        let test = TestDependencies::new();
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        let result = tokio::time::timeout(
            Duration::from_secs(1),
            PromotionSweep::new(test.deps.clone(), PromotionSweepConfig::default())
                .run(shutdown),
        )
        .await;
        assert!(matches!(result, Ok(Ok(()))));
    }
}
