//! Session pool module for sshpool
//!
//! This module provides the keyed session pool: bounded admission, per-key
//! FIFO storage, expiry on checkout, liveness probing and a background sweep.

mod entry;
mod guard;
mod manager;
mod queue;
mod session_pool;

pub use entry::Entry;
pub use guard::{PooledSession, ReturnedSession};
pub use manager::{PoolManager, PoolStats, PoolStatsSnapshot};
pub use queue::KeyedQueue;
pub use session_pool::SessionPool;

use crate::config::PoolConfig;
use crate::session::SessionFactory;
use std::sync::Arc;
use std::time::Duration;

/// Create a session pool from the four core parameters
///
/// Zero durations fall back to 10 minutes, zero bounds to 1000 sessions in
/// total and 3 per key.
pub fn new_pool<F: SessionFactory>(
    factory: F,
    lifetime: Duration,
    sweep_interval: Duration,
    max_total: usize,
    max_per_key: usize,
) -> Arc<SessionPool<F>> {
    SessionPool::new(
        PoolConfig::new(lifetime, sweep_interval, max_total, max_per_key),
        factory,
    )
}
