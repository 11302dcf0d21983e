//! Test utilities and mocks for sshpool
//!
//! This module provides common test utilities used across integration tests.

#![allow(dead_code)]

#[cfg(feature = "ssh")]
pub mod ssh_server;

use async_trait::async_trait;
use sshpool::{Identity, SessionFactory};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

/// A fake session identified by a sequence number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockSession {
    /// Unique id
    pub id: usize,
}

/// Errors produced by the mock factory
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MockError {
    /// Construction was configured to fail
    #[error("construction failed for {0}")]
    ConstructFailed(String),
    /// The session was marked dead
    #[error("session {0} is dead")]
    Dead(usize),
}

/// Shared, inspectable state of a mock factory
#[derive(Debug, Default)]
pub struct MockState {
    next_id: AtomicUsize,
    probes: AtomicUsize,
    fail_construct: AtomicBool,
    hang_probes: AtomicBool,
    dead: Mutex<HashSet<usize>>,
    closed: Mutex<Vec<usize>>,
}

/// Session factory that hands out [`MockSession`]s and records what the pool does
#[derive(Debug, Clone, Default)]
pub struct MockFactory {
    pub state: Arc<MockState>,
}

impl MockFactory {
    /// Create a new mock factory
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a new session without going through the pool
    pub fn session(&self) -> MockSession {
        MockSession {
            id: self.state.next_id.fetch_add(1, Ordering::SeqCst),
        }
    }

    /// Make the liveness probe fail for a session
    pub fn kill(&self, session: &MockSession) {
        self.state.dead.lock().unwrap().insert(session.id);
    }

    /// Make construction fail
    pub fn fail_construct(&self, fail: bool) {
        self.state.fail_construct.store(fail, Ordering::SeqCst);
    }

    /// Make probes never complete
    pub fn hang_probes(&self, hang: bool) {
        self.state.hang_probes.store(hang, Ordering::SeqCst);
    }

    /// Number of probes performed
    pub fn probe_count(&self) -> usize {
        self.state.probes.load(Ordering::SeqCst)
    }

    /// Ids of closed sessions, in close order
    pub fn closed_ids(&self) -> Vec<usize> {
        self.state.closed.lock().unwrap().clone()
    }

    /// Check if a session was closed
    pub fn is_closed(&self, session: &MockSession) -> bool {
        self.closed_ids().contains(&session.id)
    }
}

#[async_trait]
impl SessionFactory for MockFactory {
    type Session = MockSession;
    type Options = ();
    type Error = MockError;

    async fn construct(&self, identity: &Identity, _options: &()) -> Result<MockSession, MockError> {
        if self.state.fail_construct.load(Ordering::SeqCst) {
            return Err(MockError::ConstructFailed(identity.key()));
        }
        Ok(self.session())
    }

    async fn probe(&self, session: &MockSession) -> Result<(), MockError> {
        self.state.probes.fetch_add(1, Ordering::SeqCst);
        if self.state.hang_probes.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.state.dead.lock().unwrap().contains(&session.id) {
            return Err(MockError::Dead(session.id));
        }
        Ok(())
    }

    async fn close(&self, session: MockSession) -> Result<(), MockError> {
        self.state.closed.lock().unwrap().push(session.id);
        Ok(())
    }
}

/// Poll `check` until it holds or `timeout` elapses
pub async fn wait_until<F, Fut>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if check().await {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_factory_records() {
        let factory = MockFactory::new();
        let identity = Identity::new("root", "h", 22);

        let session = factory.construct(&identity, &()).await.unwrap();
        assert!(factory.probe(&session).await.is_ok());
        assert_eq!(factory.probe_count(), 1);

        factory.kill(&session);
        assert_eq!(factory.probe(&session).await, Err(MockError::Dead(session.id)));

        factory.close(session.clone()).await.unwrap();
        assert!(factory.is_closed(&session));
    }

    #[tokio::test]
    async fn test_mock_factory_fail_construct() {
        let factory = MockFactory::new();
        factory.fail_construct(true);

        let err = factory
            .construct(&Identity::new("root", "h", 22), &())
            .await
            .unwrap_err();
        assert_eq!(err, MockError::ConstructFailed("root@h:22".to_string()));
    }
}
