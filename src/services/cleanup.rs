// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Periodic removal of stale accounts and sessions.

use crate::services::auth_db::AuthDbClient;
use anyhow::{Context, Result};
use std::time::Duration;
use tokio::time::sleep;

/// Default pause between sweeps (one day).
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Shortest pause allowed between sweeps.
pub const MIN_CLEANUP_INTERVAL: Duration = Duration::from_secs(1);

/// What a single sweep removed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanupReport {
    pub unverified_users: u64,
    pub expired_sessions: u64,
}

/// Background job deleting unverified users whose code expired, and expired sessions.
pub struct CleanupJob {
    auth_db: AuthDbClient,
    interval: Duration,
}

impl CleanupJob {
    /// Intervals below [`MIN_CLEANUP_INTERVAL`] are raised to it.
    pub fn new(auth_db: AuthDbClient, interval: Duration) -> Self {
        Self {
            auth_db,
            interval: interval.max(MIN_CLEANUP_INTERVAL),
        }
    }

    /// Sweep forever, pausing `interval` between runs.
    pub async fn start(&self) {
        tracing::info!(interval_secs = self.interval.as_secs(), "cleanup job started");

        loop {
            if let Err(e) = self.run_once().await {
                tracing::error!(error = ?e, "cleanup sweep failed");
            }
            sleep(self.interval).await;
        }
    }

    /// Run a single sweep.
    pub async fn run_once(&self) -> Result<CleanupReport> {
        let now = chrono::Utc::now().timestamp_millis();

        let unverified_users = self
            .auth_db
            .delete_expired_unverified_users(now)
            .await
            .context("Failed to delete unverified users")?;
        let expired_sessions = self
            .auth_db
            .delete_expired_sessions(now)
            .await
            .context("Failed to delete expired sessions")?;

        let report = CleanupReport {
            unverified_users,
            expired_sessions,
        };
        if unverified_users > 0 || expired_sessions > 0 {
            tracing::info!(unverified_users, expired_sessions, "cleanup sweep removed records");
        } else {
            tracing::debug!("cleanup sweep found nothing to remove");
        }
        Ok(report)
    }
}
