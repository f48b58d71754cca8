//! Startup reconciliation of timers and interrupted replays.
//!
//! Two independent passes run once at process start:
//!
//! 1. Deletion re-arming: every terminal item with `deletion_armed_at` set
//!    gets its in-memory timer back, with the remaining delay floored at the
//!    configured minimum.
//! 2. Replay completion: every item with `replay_pending` set is replayed
//!    again if its detail surface survives, or has the flag cleared if not.
//!
//! A failure on one item is logged and counted; it never aborts the pass.

use super::lifecycle::{ItemLifecycleService, LifecycleError};
use super::presentation::PresentationError;
use crate::tracking::{
    domain::{Item, ItemFieldUpdate},
    ports::{ItemStore, PresentationSurface},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Per-item recovery failure.
#[derive(Debug, Error)]
enum RecoveryStepError {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error(transparent)]
    Presentation(#[from] PresentationError),
}

/// Counts produced by one recovery run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    /// Cleanup timers reconstructed.
    pub timers_rearmed: usize,
    /// Interrupted replays completed.
    pub replays_completed: usize,
    /// Replay flags cleared because the detail surface was gone.
    pub flags_cleared: usize,
    /// Items skipped after an error.
    pub failures: usize,
}

/// Repairs state left behind by a previous process.
pub struct RecoveryService<R, S, C>
where
    R: ItemStore,
    S: PresentationSurface,
    C: Clock + Send + Sync,
{
    lifecycle: ItemLifecycleService<R, S, C>,
}

impl<R, S, C> RecoveryService<R, S, C>
where
    R: ItemStore + 'static,
    S: PresentationSurface + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a recovery service arming timers on `lifecycle`'s registry.
    #[must_use]
    pub const fn new(lifecycle: ItemLifecycleService<R, S, C>) -> Self {
        Self { lifecycle }
    }

    /// Runs both repair passes.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Store`] when a pass cannot list its
    /// candidates. Per-item failures are counted instead.
    pub async fn run(&self) -> Result<RecoveryReport, LifecycleError> {
        let mut report = RecoveryReport::default();
        self.rearm_deletions(&mut report).await?;
        self.complete_replays(&mut report).await?;
        info!(
            timers_rearmed = report.timers_rearmed,
            replays_completed = report.replays_completed,
            flags_cleared = report.flags_cleared,
            failures = report.failures,
            "recovery complete"
        );
        Ok(report)
    }

    async fn rearm_deletions(&self, report: &mut RecoveryReport) -> Result<(), LifecycleError> {
        let armed = self
            .lifecycle
            .store()
            .query_terminal_with_armed_deletion()
            .await?;
        let now = self.lifecycle.clock().utc();
        for item in armed {
            match self.rearm(&item, now).await {
                Ok(true) => report.timers_rearmed += 1,
                Ok(false) => {}
                Err(err) => {
                    error!(item_id = %item.id(), error = %err, "re-arming cleanup failed");
                    report.failures += 1;
                }
            }
        }
        Ok(())
    }

    async fn rearm(&self, item: &Item, now: DateTime<Utc>) -> Result<bool, RecoveryStepError> {
        let Some(armed_at) = item.deletion_armed_at() else {
            return Ok(false);
        };
        if !item.kind().descriptor().is_cleanup_eligible(item.status()) {
            warn!(
                item_id = %item.id(),
                status = %item.status(),
                "clearing deletion mark on a state that is never cleaned up"
            );
            self.lifecycle
                .store()
                .set_field(item.id(), ItemFieldUpdate::DeletionArmedAt(None))
                .await
                .map_err(LifecycleError::from)?;
            return Ok(false);
        }
        let config = self.lifecycle.config();
        let delay = remaining_delay(
            armed_at,
            config.delete_delay(item.kind()),
            now,
            config.min_rearm_delay(),
        );
        self.lifecycle.arm_cleanup(item.id(), item.status(), delay);
        debug!(item_id = %item.id(), delay = ?delay, "re-armed cleanup timer");
        Ok(true)
    }

    async fn complete_replays(&self, report: &mut RecoveryReport) -> Result<(), LifecycleError> {
        let pending = self.lifecycle.store().query_replay_pending().await?;
        for item in pending {
            let id = item.id();
            match self.complete_replay(item).await {
                Ok(true) => report.replays_completed += 1,
                Ok(false) => report.flags_cleared += 1,
                Err(err) => {
                    error!(item_id = %id, error = %err, "completing replay failed");
                    report.failures += 1;
                }
            }
        }
        Ok(())
    }

    /// Returns `true` when a replay ran and `false` when only the flag was
    /// cleared.
    async fn complete_replay(&self, item: Item) -> Result<bool, RecoveryStepError> {
        let presentation = self.lifecycle.presentation();
        if presentation.live_detail_surface(&item).await?.is_some() {
            presentation.replay_history(item).await?;
            return Ok(true);
        }
        self.lifecycle
            .store()
            .set_field(item.id(), ItemFieldUpdate::ReplayPending(false))
            .await
            .map_err(LifecycleError::from)?;
        Ok(false)
    }
}

/// Computes `max(armed_at + delay - now, floor)`.
///
/// Elapsed time is subtracted from `delay` rather than deriving a deadline,
/// so delays too large for a timestamp stay large. A clock that reads
/// earlier than `armed_at` counts as no time elapsed.
#[must_use]
pub fn remaining_delay(
    armed_at: DateTime<Utc>,
    delay: Duration,
    now: DateTime<Utc>,
    floor: Duration,
) -> Duration {
    let elapsed = now
        .signed_duration_since(armed_at)
        .to_std()
        .unwrap_or(Duration::ZERO);
    delay.saturating_sub(elapsed).max(floor)
}
