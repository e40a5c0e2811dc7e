//! Bounded channel with configurable overflow handling.
//!
//! Progress delivery must never back-pressure the producer: each
//! subscriber gets a channel with the drop-oldest policy, so a slow
//! consumer observes fewer intermediate items but always the latest ones.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

/// Overflow policy for a full channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Block the sender until space is available.
    Block,
    /// Evict the oldest buffered item to make room (coalescing).
    #[default]
    DropOldest,
    /// Reject the new item.
    DropNewest,
}

/// Counters observed on a channel.
#[derive(Debug, Clone, Default)]
pub struct ChannelStats {
    pub items_sent: u64,
    pub items_received: u64,
    pub items_dropped: u64,
}

/// A bounded multi-producer channel. Clones share the same buffer.
pub struct BoundedChannel<T> {
    inner: Arc<ChannelInner<T>>,
    capacity: usize,
    policy: OverflowPolicy,
}

struct ChannelInner<T> {
    buffer: Mutex<VecDeque<T>>,
    not_full: Condvar,
    not_empty: Condvar,
    closed: AtomicBool,
    items_sent: AtomicU64,
    items_received: AtomicU64,
    items_dropped: AtomicU64,
}

impl<T> BoundedChannel<T> {
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Self {
        Self {
            inner: Arc::new(ChannelInner {
                buffer: Mutex::new(VecDeque::with_capacity(capacity)),
                not_full: Condvar::new(),
                not_empty: Condvar::new(),
                closed: AtomicBool::new(false),
                items_sent: AtomicU64::new(0),
                items_received: AtomicU64::new(0),
                items_dropped: AtomicU64::new(0),
            }),
            capacity: capacity.max(1),
            policy,
        }
    }

    /// Send an item. Returns `false` if it was dropped, and `false`
    /// without buffering anything once the channel is closed.
    pub fn send(&self, item: T) -> bool {
        if self.inner.closed.load(Ordering::SeqCst) {
            return false;
        }

        let mut buffer = self.inner.buffer.lock().expect("channel lock poisoned");
        if buffer.len() >= self.capacity {
            match self.policy {
                OverflowPolicy::Block => {
                    buffer = self
                        .inner
                        .not_full
                        .wait_while(buffer, |b| {
                            b.len() >= self.capacity && !self.inner.closed.load(Ordering::SeqCst)
                        })
                        .expect("channel lock poisoned");
                    if self.inner.closed.load(Ordering::SeqCst) {
                        return false;
                    }
                }
                OverflowPolicy::DropOldest => {
                    buffer.pop_front();
                    self.inner.items_dropped.fetch_add(1, Ordering::Relaxed);
                }
                OverflowPolicy::DropNewest => {
                    self.inner.items_dropped.fetch_add(1, Ordering::Relaxed);
                    return false;
                }
            }
        }

        buffer.push_back(item);
        self.inner.items_sent.fetch_add(1, Ordering::Relaxed);
        drop(buffer);
        self.inner.not_empty.notify_one();
        true
    }

    /// Receive the next item, blocking while the channel is open and empty.
    pub fn recv(&self) -> Option<T> {
        let mut buffer = self.inner.buffer.lock().expect("channel lock poisoned");
        while buffer.is_empty() {
            if self.inner.closed.load(Ordering::SeqCst) {
                return None;
            }
            buffer = self
                .inner
                .not_empty
                .wait(buffer)
                .expect("channel lock poisoned");
        }
        self.pop(&mut buffer)
    }

    /// Receive with a timeout. `None` on timeout or closed-and-empty.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;
        let mut buffer = self.inner.buffer.lock().expect("channel lock poisoned");
        while buffer.is_empty() {
            if self.inner.closed.load(Ordering::SeqCst) {
                return None;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            let (next, wait) = self
                .inner
                .not_empty
                .wait_timeout(buffer, remaining)
                .expect("channel lock poisoned");
            buffer = next;
            if wait.timed_out() && buffer.is_empty() {
                return None;
            }
        }
        self.pop(&mut buffer)
    }

    /// Receive without blocking.
    pub fn try_recv(&self) -> Option<T> {
        let mut buffer = self.inner.buffer.lock().expect("channel lock poisoned");
        self.pop(&mut buffer)
    }

    fn pop(&self, buffer: &mut VecDeque<T>) -> Option<T> {
        let item = buffer.pop_front();
        if item.is_some() {
            self.inner.items_received.fetch_add(1, Ordering::Relaxed);
            self.inner.not_full.notify_one();
        }
        item
    }

    /// Close the channel. Buffered items remain receivable.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        self.inner.not_full.notify_all();
        self.inner.not_empty.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.inner.buffer.lock().expect("channel lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> ChannelStats {
        ChannelStats {
            items_sent: self.inner.items_sent.load(Ordering::Relaxed),
            items_received: self.inner.items_received.load(Ordering::Relaxed),
            items_dropped: self.inner.items_dropped.load(Ordering::Relaxed),
        }
    }
}

impl<T> Clone for BoundedChannel<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            capacity: self.capacity,
            policy: self.policy,
        }
    }
}
