//! Keyed session pool implementation
//!
//! Stores idle sessions per key with bounded admission, expires them lazily
//! on checkout and actively from a background sweeper.

use super::entry::Entry;
use super::guard::{PooledSession, ReturnedSession};
use super::manager::{PoolManager, PoolStats};
use super::queue::KeyedQueue;
use crate::config::PoolConfig;
use crate::error::{AdmissionError, Rejected};
use crate::session::{Identity, SessionFactory};
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Everything guarded by the pool lock
#[derive(Debug)]
struct PoolState<S> {
    /// Per-key queues; a key is present only while its queue is non-empty
    queues: HashMap<String, KeyedQueue<S>>,
    /// Sum of all queue lengths
    total: usize,
    /// Set once by close
    closed: bool,
}

impl<S> PoolState<S> {
    fn new() -> Self {
        PoolState {
            queues: HashMap::new(),
            total: 0,
            closed: false,
        }
    }

    fn push(&mut self, key: &str, session: S, config: &PoolConfig) -> Result<(), Rejected<S>> {
        if self.closed {
            return Err(Rejected::new(AdmissionError::Closed, session));
        }
        if self.total >= config.max_total {
            return Err(Rejected::new(AdmissionError::PoolFull, session));
        }

        let queue = self
            .queues
            .entry(key.to_string())
            .or_insert_with(|| KeyedQueue::new(config.max_per_key));

        match queue.try_push(Entry::new(session, config.lifetime())) {
            Ok(()) => {
                self.total += 1;
                Ok(())
            }
            Err(entry) => {
                if queue.is_empty() {
                    self.queues.remove(key);
                }
                Err(Rejected::new(AdmissionError::KeyFull, entry.into_session()))
            }
        }
    }

    fn pop_front(&mut self, key: &str) -> Option<Entry<S>> {
        let queue = self.queues.get_mut(key)?;
        let entry = queue.pop_front();
        if queue.is_empty() {
            self.queues.remove(key);
        }
        if entry.is_some() {
            self.total -= 1;
        }
        entry
    }

    fn remove_key(&mut self, key: &str) -> Vec<Entry<S>> {
        let Some(mut queue) = self.queues.remove(key) else {
            return Vec::new();
        };
        self.total -= queue.len();
        queue.drain().collect()
    }

    fn sweep(&mut self) -> Vec<Entry<S>> {
        let mut expired = Vec::new();
        self.queues.retain(|_, queue| {
            expired.extend(queue.sweep_expired());
            !queue.is_empty()
        });
        self.total -= expired.len();
        expired
    }

    fn take_all(&mut self) -> Vec<Entry<S>> {
        let entries = self
            .queues
            .drain()
            .flat_map(|(_, mut queue)| queue.drain().collect::<Vec<_>>())
            .collect();
        self.total = 0;
        entries
    }
}

/// Bounded, time-expiring pool of sessions keyed by identity
///
/// A single lock guards all queues and the running total. Probing and
/// closing sessions always happens after that lock has been released.
pub struct SessionPool<F: SessionFactory> {
    /// Pool configuration
    config: PoolConfig,
    /// Builds, probes and closes sessions
    factory: Arc<F>,
    /// Queues and counters
    state: Mutex<PoolState<F::Session>>,
    /// Sweeper control and statistics
    manager: PoolManager,
    /// Background sweeper, taken by close
    sweeper: Mutex<Option<JoinHandle<()>>>,
    /// Channel for checking guarded sessions back in
    return_tx: mpsc::Sender<ReturnedSession<F::Session>>,
}

impl<F: SessionFactory> SessionPool<F> {
    /// Create a new session pool and start its background sweeper
    ///
    /// Zero durations and bounds in `config` fall back to the defaults
    /// (10 minutes, 1000 total, 3 per key). Must be called within a tokio
    /// runtime.
    pub fn new(config: PoolConfig, factory: F) -> Arc<Self> {
        let config = config.normalized();
        let stats = Arc::new(PoolStats::new());
        let manager = PoolManager::new(config.clone(), stats);

        let (return_tx, return_rx) = mpsc::channel(config.max_total);

        info!(
            "Creating session pool: lifetime={:?}, sweep_interval={:?}, max_total={}, max_per_key={}",
            config.lifetime(),
            config.sweep_interval(),
            config.max_total,
            config.max_per_key
        );

        Arc::new_cyclic(|pool: &Weak<Self>| {
            tokio::spawn(Self::run_return_handler(pool.clone(), return_rx));
            let sweeper = tokio::spawn(Self::run_sweeper(pool.clone(), manager.clone()));

            SessionPool {
                config,
                factory: Arc::new(factory),
                state: Mutex::new(PoolState::new()),
                manager,
                sweeper: Mutex::new(Some(sweeper)),
                return_tx,
            }
        })
    }

    /// Store an idle session under `key`
    ///
    /// On rejection the session is handed back untouched; the pool never
    /// takes ownership of a session it did not store.
    pub async fn put(&self, key: &str, session: F::Session) -> Result<(), Rejected<F::Session>> {
        let result = {
            let mut state = self.state.lock().await;
            state.push(key, session, &self.config)
        };

        match &result {
            Ok(()) => {
                self.stats().record_put();
                debug!("Session stored for {}", key);
            }
            Err(rejected) => {
                self.stats().record_rejected();
                debug!("Session for {} rejected: {}", key, rejected.reason());
            }
        }
        result
    }

    /// Check out a usable session for `key`
    ///
    /// Expired sessions and sessions failing the liveness probe are closed
    /// and skipped. Sessions younger than the fresh threshold are handed out
    /// without probing. Returns `None` once the key has nothing usable left.
    pub async fn get(&self, key: &str) -> Option<F::Session> {
        loop {
            let entry = {
                let mut state = self.state.lock().await;
                if state.closed {
                    return None;
                }
                state.pop_front(key)?
            };

            if entry.is_expired() {
                debug!("Discarding expired session for {}", key);
                self.stats().record_expired(1);
                self.close_session(entry.into_session()).await;
                continue;
            }

            if entry.is_fresh(self.config.fresh_threshold()) {
                self.stats().record_checked_out();
                return Some(entry.into_session());
            }

            let session = entry.into_session();
            match tokio::time::timeout(self.config.probe_timeout(), self.factory.probe(&session))
                .await
            {
                Ok(Ok(())) => {
                    self.stats().record_checked_out();
                    return Some(session);
                }
                Ok(Err(e)) => warn!("Liveness probe failed for {}: {}", key, e),
                Err(_) => warn!("Liveness probe timed out for {}", key),
            }

            self.stats().record_probe_failed();
            self.close_session(session).await;
        }
    }

    /// Check out a pooled session, or build a new one through the factory
    ///
    /// The new session is not stored; hand it back with [`put`](Self::put)
    /// when done with it.
    pub async fn get_or_create(
        &self,
        key: &str,
        identity: &Identity,
        options: &F::Options,
    ) -> Result<F::Session, F::Error> {
        if let Some(session) = self.get(key).await {
            return Ok(session);
        }

        debug!("No pooled session for {}, connecting to {}", key, identity);
        let session = self.factory.construct(identity, options).await?;
        self.stats().record_created();
        Ok(session)
    }

    /// Check out a session for `identity` wrapped in a guard
    ///
    /// The guard checks the session back in under `identity.key()` when
    /// dropped. A check-in the pool refuses closes the session.
    pub async fn checkout(
        &self,
        identity: &Identity,
        options: &F::Options,
    ) -> Result<PooledSession<F::Session>, F::Error> {
        let key = identity.key();
        let session = self.get_or_create(&key, identity, options).await?;
        Ok(PooledSession::new(key, session, self.return_tx.clone()))
    }

    /// Close and forget every session stored under `key`
    pub async fn delete(&self, key: &str) {
        let entries = {
            let mut state = self.state.lock().await;
            state.remove_key(key)
        };

        if entries.is_empty() {
            return;
        }

        debug!("Deleting {} sessions for {}", entries.len(), key);
        self.close_entries(entries).await;
    }

    /// Number of sessions currently stored
    pub async fn len(&self) -> usize {
        self.state.lock().await.total
    }

    /// Check if the pool stores no sessions
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Number of sessions stored under `key`
    pub async fn key_len(&self, key: &str) -> usize {
        let state = self.state.lock().await;
        state.queues.get(key).map_or(0, KeyedQueue::len)
    }

    /// Keys that currently hold at least one session
    pub async fn keys(&self) -> Vec<String> {
        let state = self.state.lock().await;
        state.queues.keys().cloned().collect()
    }

    /// Close every expired session, returning how many were reclaimed
    pub async fn sweep(&self) -> usize {
        let (expired, remaining) = {
            let mut state = self.state.lock().await;
            let expired = state.sweep();
            (expired, state.total)
        };

        let count = expired.len();
        if count > 0 {
            debug!("Swept {} expired sessions, {} remaining", count, remaining);
            self.stats().record_expired(count);
            self.close_entries(expired).await;
        }
        self.manager.log_health(remaining);
        count
    }

    /// Stop the sweeper and close every stored session
    ///
    /// The sweeper has terminated when this returns. Further puts are
    /// rejected with [`AdmissionError::Closed`] and gets return `None`.
    pub async fn close(&self) {
        if !self.manager.shutdown() {
            warn!("Session pool already closed");
            return;
        }

        if let Some(sweeper) = self.sweeper.lock().await.take() {
            if let Err(e) = sweeper.await {
                warn!("Pool sweeper ended abnormally: {}", e);
            }
        }

        let entries = {
            let mut state = self.state.lock().await;
            state.closed = true;
            state.take_all()
        };

        info!("Closing session pool: {} pooled sessions", entries.len());
        self.close_entries(entries).await;
    }

    /// Check if close has been called
    pub fn is_closed(&self) -> bool {
        self.manager.is_shutdown()
    }

    /// Get pool statistics
    pub fn stats(&self) -> &PoolStats {
        self.manager.stats()
    }

    /// Get the effective configuration
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Get the session factory
    pub fn factory(&self) -> &F {
        &self.factory
    }

    async fn close_session(&self, session: F::Session) {
        if let Err(e) = self.factory.close(session).await {
            debug!("Error closing session: {}", e);
        }
        self.stats().record_closed();
    }

    async fn close_entries(&self, entries: Vec<Entry<F::Session>>) {
        join_all(
            entries
                .into_iter()
                .map(|entry| self.close_session(entry.into_session())),
        )
        .await;
    }

    /// Put a guarded session back, closing it if the pool refuses it
    async fn check_in(&self, returned: ReturnedSession<F::Session>) {
        if let Err(rejected) = self.put(&returned.key, returned.session).await {
            debug!(
                "Returned session for {} not pooled: {}",
                returned.key,
                rejected.reason()
            );
            self.close_session(rejected.into_session()).await;
        }
    }

    /// Run the check-in handler until the pool is dropped
    async fn run_return_handler(
        pool: Weak<Self>,
        mut rx: mpsc::Receiver<ReturnedSession<F::Session>>,
    ) {
        while let Some(returned) = rx.recv().await {
            let Some(pool) = pool.upgrade() else {
                break;
            };
            pool.check_in(returned).await;
        }
    }

    /// Run the eviction sweeper until shutdown or until the pool is dropped
    async fn run_sweeper(pool: Weak<Self>, manager: PoolManager) {
        let interval: Duration = manager.sweep_interval();

        loop {
            tokio::select! {
                _ = manager.wait_shutdown() => {
                    info!("Pool sweeper shutting down");
                    break;
                }
                _ = tokio::time::sleep(interval) => {
                    let Some(pool) = pool.upgrade() else {
                        break;
                    };
                    pool.sweep().await;
                }
            }
        }
    }
}
