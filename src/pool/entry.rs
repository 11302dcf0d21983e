//! Pooled session entry
//!
//! Pairs a stored session with the instant it stops being valid.

use std::time::Duration;
use tokio::time::Instant;

/// A stored session with expiry metadata
#[derive(Debug)]
pub struct Entry<S> {
    /// The underlying session
    pub(crate) session: S,
    /// When the entry was stored
    pub(crate) inserted_at: Instant,
    /// After this instant the entry is stale
    pub(crate) expires_at: Instant,
}

impl<S> Entry<S> {
    /// Create an entry that expires `lifetime` from now
    pub fn new(session: S, lifetime: Duration) -> Self {
        let now = Instant::now();
        Entry {
            session,
            inserted_at: now,
            expires_at: now + lifetime,
        }
    }

    /// Check if the entry is past its expiry instant
    pub fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }

    /// Time since the entry was stored
    pub fn age(&self) -> Duration {
        self.inserted_at.elapsed()
    }

    /// Time left before the entry expires
    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    /// Check if the entry was stored less than `threshold` ago
    pub fn is_fresh(&self, threshold: Duration) -> bool {
        self.age() < threshold
    }

    /// Get the underlying session
    pub fn into_session(self) -> S {
        self.session
    }

    /// Get a reference to the session
    pub fn session(&self) -> &S {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_entry_new() {
        let entry = Entry::new(42, Duration::from_secs(600));
        assert!(!entry.is_expired());
        assert_eq!(entry.age(), Duration::ZERO);
        assert_eq!(entry.remaining(), Duration::from_secs(600));
        assert_eq!(*entry.session(), 42);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expiry_is_strict() {
        let entry = Entry::new("s", Duration::from_secs(10));

        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(!entry.is_expired());
        assert_eq!(entry.remaining(), Duration::ZERO);

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(entry.is_expired());
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_freshness() {
        let entry = Entry::new(0, Duration::from_secs(600));
        assert!(entry.is_fresh(Duration::from_secs(60)));

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(entry.is_fresh(Duration::from_secs(60)));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(!entry.is_fresh(Duration::from_secs(60)));
        assert_eq!(entry.remaining(), Duration::from_secs(540));
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_zero_threshold_never_fresh() {
        let entry = Entry::new(0, Duration::from_secs(600));
        assert!(!entry.is_fresh(Duration::ZERO));
    }

    #[test]
    fn test_entry_into_session() {
        let entry = Entry::new("my_session", Duration::from_secs(1));
        assert_eq!(entry.into_session(), "my_session");
    }
}
