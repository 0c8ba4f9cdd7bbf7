// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Bounded in-memory cache of posts that ran out of retries
//!
//! Not durable: the store keeps such swaps marked `Retryable`, and they are
//! requeued on startup.

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::RelayOutcome;
use crate::types::RegisteredSwap;

/// Fixed-capacity ring buffer. Pushing into a full ring overwrites the
/// oldest element.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    slots: Vec<Option<T>>,
    /// Next slot to write
    head: usize,
    len: usize,
}

impl<T> RingBuffer<T> {
    /// A zero capacity is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: std::iter::repeat_with(|| None).take(capacity).collect(),
            head: 0,
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends `item`, returning the element it displaced when full.
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = self.slots[self.head].replace(item);
        self.head = (self.head + 1) % self.capacity();
        if evicted.is_none() {
            self.len += 1;
        }
        evicted
    }

    /// Removes every element, oldest first.
    pub fn drain(&mut self) -> Vec<T> {
        let capacity = self.capacity();
        let start = (self.head + capacity - self.len) % capacity;
        let items = (0..self.len)
            .filter_map(|i| self.slots[(start + i) % capacity].take())
            .collect();
        self.head = 0;
        self.len = 0;
        items
    }
}

/// A swap whose delivery exhausted its retry budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedPost {
    pub swap: RegisteredSwap,
    pub last_outcome: RelayOutcome,
    pub enqueued_at: DateTime<Utc>,
}

/// Shared ring of [`CachedPost`]s.
#[derive(Debug)]
pub struct RetryCache {
    ring: Mutex<RingBuffer<CachedPost>>,
}

impl RetryCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: Mutex::new(RingBuffer::new(capacity)),
        }
    }

    /// Caches `post`, returning the oldest entry if it had to be dropped.
    pub async fn push(&self, post: CachedPost) -> Option<CachedPost> {
        self.ring.lock().await.push(post)
    }

    pub async fn drain(&self) -> Vec<CachedPost> {
        self.ring.lock().await.drain()
    }

    pub async fn len(&self) -> usize {
        self.ring.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.ring.lock().await.is_empty()
    }

    pub async fn capacity(&self) -> usize {
        self.ring.lock().await.capacity()
    }
}
