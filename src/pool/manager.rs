//! Pool manager for the eviction sweeper
//!
//! Holds the sweep timing, the shutdown signal and the pool statistics.

use crate::config::PoolConfig;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::debug;

/// Statistics for the session pool
#[derive(Debug, Default)]
pub struct PoolStats {
    /// Sessions accepted by put
    pub total_put: AtomicUsize,
    /// Puts refused by admission control
    pub total_rejected: AtomicUsize,
    /// Sessions handed out by get
    pub total_checked_out: AtomicUsize,
    /// Sessions built through the factory on a pool miss
    pub total_created: AtomicUsize,
    /// Sessions discarded because they expired
    pub total_expired: AtomicUsize,
    /// Sessions discarded because the liveness probe failed
    pub total_probe_failed: AtomicUsize,
    /// Sessions closed by the pool
    pub total_closed: AtomicUsize,
}

impl PoolStats {
    /// Create new pool stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an accepted put
    pub fn record_put(&self) {
        self.total_put.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a rejected put
    pub fn record_rejected(&self) {
        self.total_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a checkout
    pub fn record_checked_out(&self) {
        self.total_checked_out.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a session creation
    pub fn record_created(&self) {
        self.total_created.fetch_add(1, Ordering::Relaxed);
    }

    /// Record expired sessions
    pub fn record_expired(&self, count: usize) {
        self.total_expired.fetch_add(count, Ordering::Relaxed);
    }

    /// Record a failed probe
    pub fn record_probe_failed(&self) {
        self.total_probe_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a session close
    pub fn record_closed(&self) {
        self.total_closed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current stats snapshot
    pub fn snapshot(&self) -> PoolStatsSnapshot {
        PoolStatsSnapshot {
            total_put: self.total_put.load(Ordering::Relaxed),
            total_rejected: self.total_rejected.load(Ordering::Relaxed),
            total_checked_out: self.total_checked_out.load(Ordering::Relaxed),
            total_created: self.total_created.load(Ordering::Relaxed),
            total_expired: self.total_expired.load(Ordering::Relaxed),
            total_probe_failed: self.total_probe_failed.load(Ordering::Relaxed),
            total_closed: self.total_closed.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of pool statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct PoolStatsSnapshot {
    pub total_put: usize,
    pub total_rejected: usize,
    pub total_checked_out: usize,
    pub total_created: usize,
    pub total_expired: usize,
    pub total_probe_failed: usize,
    pub total_closed: usize,
}

/// Pool manager for background maintenance
#[derive(Debug, Clone)]
pub struct PoolManager {
    /// Configuration
    config: PoolConfig,
    /// Statistics
    stats: Arc<PoolStats>,
    /// Shutdown signal
    shutdown: Arc<Notify>,
    /// Whether shutdown has been requested
    is_shutdown: Arc<AtomicBool>,
}

impl PoolManager {
    /// Create a new pool manager
    pub fn new(config: PoolConfig, stats: Arc<PoolStats>) -> Self {
        PoolManager {
            config,
            stats,
            shutdown: Arc::new(Notify::new()),
            is_shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get pool statistics
    pub fn stats(&self) -> &Arc<PoolStats> {
        &self.stats
    }

    /// Signal shutdown
    ///
    /// Returns false if shutdown had already been requested.
    pub fn shutdown(&self) -> bool {
        let first = !self.is_shutdown.swap(true, Ordering::SeqCst);
        if first {
            // notify_one stores a permit, so a sweeper that is mid-sweep still sees it
            self.shutdown.notify_one();
        }
        first
    }

    /// Check if shutdown has been requested
    pub fn is_shutdown(&self) -> bool {
        self.is_shutdown.load(Ordering::SeqCst)
    }

    /// Get the sweep interval
    pub fn sweep_interval(&self) -> Duration {
        self.config.sweep_interval()
    }

    /// Wait for shutdown signal
    pub async fn wait_shutdown(&self) {
        self.shutdown.notified().await;
    }

    /// Log pool health status
    pub fn log_health(&self, pooled: usize) {
        let stats = self.stats.snapshot();
        debug!(
            "Pool health: pooled={}, put={}, rejected={}, checked_out={}, created={}, expired={}, probe_failed={}, closed={}",
            pooled,
            stats.total_put,
            stats.total_rejected,
            stats.total_checked_out,
            stats.total_created,
            stats.total_expired,
            stats.total_probe_failed,
            stats.total_closed
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_stats_new() {
        let stats = PoolStats::new();
        assert_eq!(stats.snapshot(), PoolStatsSnapshot::default());
    }

    #[test]
    fn test_pool_stats_record() {
        let stats = PoolStats::new();
        stats.record_put();
        stats.record_put();
        stats.record_rejected();
        stats.record_checked_out();
        stats.record_created();
        stats.record_expired(3);
        stats.record_probe_failed();
        stats.record_closed();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total_put, 2);
        assert_eq!(snapshot.total_rejected, 1);
        assert_eq!(snapshot.total_checked_out, 1);
        assert_eq!(snapshot.total_created, 1);
        assert_eq!(snapshot.total_expired, 3);
        assert_eq!(snapshot.total_probe_failed, 1);
        assert_eq!(snapshot.total_closed, 1);
    }

    #[test]
    fn test_pool_manager_sweep_interval() {
        let config = PoolConfig::new(Duration::from_secs(5), Duration::from_secs(7), 10, 2);
        let manager = PoolManager::new(config, Arc::new(PoolStats::new()));
        assert_eq!(manager.sweep_interval(), Duration::from_secs(7));
    }

    #[test]
    fn test_pool_manager_shutdown_once() {
        let manager = PoolManager::new(PoolConfig::default(), Arc::new(PoolStats::new()));

        assert!(!manager.is_shutdown());
        assert!(manager.shutdown());
        assert!(manager.is_shutdown());
        assert!(!manager.shutdown());
    }

    #[tokio::test]
    async fn test_pool_manager_wait_shutdown_after_signal() {
        let manager = PoolManager::new(PoolConfig::default(), Arc::new(PoolStats::new()));
        manager.shutdown();

        // The stored permit lets a late waiter return immediately
        tokio::time::timeout(Duration::from_millis(100), manager.wait_shutdown())
            .await
            .unwrap();
    }
}
