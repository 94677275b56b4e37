//! Session pruner: periodic deletion of long-expired sessions.
//!
//! Runs as a single background task so runs never overlap; each cycle
//! awaits its sweep before the next interval tick can fire.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{error, info, warn};

use crate::domain::entities::session::PRUNE_GRACE_DAYS;
use crate::errors::DomainError;
use crate::repositories::session::SessionRepository;

/// Configuration for the session pruner
#[derive(Debug, Clone)]
pub struct SessionCleanupConfig {
    /// How often to run the sweep (in seconds)
    pub interval_seconds: u64,
    /// Grace period after expiry before deletion (in days)
    pub grace_period_days: i64,
    /// Whether to enable the background sweep
    pub enabled: bool,
}

impl Default for SessionCleanupConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 86400, // Run daily
            grace_period_days: PRUNE_GRACE_DAYS,
            enabled: true,
        }
    }
}

/// Service for pruning long-expired sessions
pub struct SessionCleanupService<S: SessionRepository + 'static> {
    repository: Arc<S>,
    config: SessionCleanupConfig,
}

impl<S: SessionRepository> SessionCleanupService<S> {
    /// Create a new session cleanup service
    pub fn new(repository: Arc<S>, config: SessionCleanupConfig) -> Self {
        Self { repository, config }
    }

    /// Run a single prune cycle
    ///
    /// Deletes sessions whose hard expiry is more than the grace period in
    /// the past, regardless of revocation state. Their ledger rows go with
    /// them.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of sessions deleted
    /// * `Err(DomainError)` - If the sweep fails
    pub async fn run_cleanup(&self) -> Result<usize, DomainError> {
        let cutoff = Utc::now() - Duration::days(self.config.grace_period_days);

        let deleted = self.repository.delete_expired_before(cutoff).await?;
        if deleted > 0 {
            info!(deleted, "Pruned expired sessions");
        }

        Ok(deleted)
    }

    /// Start the pruner as a background task
    ///
    /// Spawns a tokio task that runs the sweep at regular intervals. Only
    /// one instance should be started per process.
    pub fn start_background_task(self: Arc<Self>) {
        if !self.config.enabled {
            warn!("Session pruner is disabled");
            return;
        }

        let interval = std::time::Duration::from_secs(self.config.interval_seconds);

        tokio::spawn(async move {
            info!(
                "Session pruner started - will run every {} seconds",
                self.config.interval_seconds
            );

            let mut interval_timer = tokio::time::interval(interval);
            // The first tick fires immediately; skip it so startup is quiet.
            interval_timer.tick().await;

            loop {
                interval_timer.tick().await;

                if let Err(e) = self.run_cleanup().await {
                    error!("Session prune cycle failed: {}", e);
                }
            }
        });
    }
}
