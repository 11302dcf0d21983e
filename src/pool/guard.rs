//! RAII guard for checked-out sessions
//!
//! Provides automatic check-in of sessions when the guard is dropped.

use std::ops::{Deref, DerefMut};
use tokio::sync::mpsc;

/// RAII guard that checks the session back into the pool on drop
///
/// The guard owns the session exclusively while it is alive. On drop the
/// session is queued for check-in under the key it was checked out with,
/// unless it was explicitly taken.
pub struct PooledSession<S: Send + 'static> {
    /// Pool key the session belongs to
    key: String,
    /// The session (Option to allow taking)
    session: Option<S>,
    /// Channel back to the pool's check-in task
    return_tx: Option<mpsc::Sender<ReturnedSession<S>>>,
}

/// A session on its way back into the pool
pub struct ReturnedSession<S> {
    /// Pool key
    pub key: String,
    /// The session
    pub session: S,
}

impl<S: Send + 'static> PooledSession<S> {
    /// Create a new guard
    pub fn new(key: String, session: S, return_tx: mpsc::Sender<ReturnedSession<S>>) -> Self {
        PooledSession {
            key,
            session: Some(session),
            return_tx: Some(return_tx),
        }
    }

    /// Pool key of this session
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Take ownership of the session (won't return to pool)
    pub fn take(mut self) -> S {
        self.return_tx = None;
        self.session.take().expect("Session already taken")
    }
}

impl<S: Send + 'static> Deref for PooledSession<S> {
    type Target = S;

    fn deref(&self) -> &Self::Target {
        self.session.as_ref().expect("Session already taken")
    }
}

impl<S: Send + 'static> DerefMut for PooledSession<S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.session.as_mut().expect("Session already taken")
    }
}

impl<S: Send + 'static> Drop for PooledSession<S> {
    fn drop(&mut self) {
        if let (Some(session), Some(return_tx)) = (self.session.take(), self.return_tx.take()) {
            let returned = ReturnedSession {
                key: std::mem::take(&mut self.key),
                session,
            };
            // Full or closed channel: the session is dropped, which tears it down
            let _ = return_tx.try_send(returned);
        }
    }
}
