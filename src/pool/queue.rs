//! Per-key bounded FIFO queue

use super::entry::Entry;
use std::collections::VecDeque;

/// Bounded FIFO of entries stored under one key
///
/// Pushing onto a full queue is rejected, never blocked.
#[derive(Debug)]
pub struct KeyedQueue<S> {
    entries: VecDeque<Entry<S>>,
    capacity: usize,
}

impl<S> KeyedQueue<S> {
    /// Create an empty queue holding at most `capacity` entries
    pub fn new(capacity: usize) -> Self {
        KeyedQueue {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an entry, handing it back if the queue is full
    pub fn try_push(&mut self, entry: Entry<S>) -> Result<(), Entry<S>> {
        if self.is_full() {
            return Err(entry);
        }
        self.entries.push_back(entry);
        Ok(())
    }

    /// Remove the oldest entry
    pub fn pop_front(&mut self) -> Option<Entry<S>> {
        self.entries.pop_front()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the queue holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if the queue is at capacity
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Remove every entry, oldest first
    pub fn drain(&mut self) -> impl Iterator<Item = Entry<S>> + '_ {
        self.entries.drain(..)
    }

    /// Drop expired entries and return them
    ///
    /// Each entry present when the scan starts is looked at exactly once.
    /// Survivors are re-enqueued at the tail, which keeps their relative order.
    pub fn sweep_expired(&mut self) -> Vec<Entry<S>> {
        let mut expired = Vec::new();
        for _ in 0..self.entries.len() {
            let Some(entry) = self.entries.pop_front() else {
                break;
            };
            if entry.is_expired() {
                expired.push(entry);
            } else {
                self.entries.push_back(entry);
            }
        }
        expired
    }
}
