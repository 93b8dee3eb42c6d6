//! In-memory pub/sub transport.

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use msg_dispatch::error::TransportError;
use msg_dispatch::ports::NotifyTransport;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::debug;

/// Maximum payloads buffered per subject before slow receivers lag.
pub const DEFAULT_SUBJECT_CAPACITY: usize = 1024;

/// Broker semantics in process memory: one broadcast channel per subject,
/// fire-and-forget delivery.
///
/// Suitable for single-node operation and for the test suite; a
/// distributed deployment swaps in an adapter over a real broker.
pub struct MemoryBus {
    subjects: DashMap<String, broadcast::Sender<Bytes>>,
    capacity: usize,
    closed: AtomicBool,
    published: AtomicU64,
}

impl MemoryBus {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_SUBJECT_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            subjects: DashMap::new(),
            capacity,
            closed: AtomicBool::new(false),
            published: AtomicU64::new(0),
        }
    }

    /// Attach a receiver to a subject, creating the subject if needed.
    pub fn subscribe(&self, subject: &str) -> broadcast::Receiver<Bytes> {
        self.subjects
            .entry(subject.to_owned())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Total payloads accepted for publishing.
    #[must_use]
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed)
    }
}

impl Default for MemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotifyTransport for MemoryBus {
    async fn publish(&self, subject: &str, payload: Bytes) -> Result<(), TransportError> {
        if self.closed.load(Ordering::Relaxed) {
            return Err(TransportError::Closed);
        }
        self.published.fetch_add(1, Ordering::Relaxed);
        match self.subjects.get(subject) {
            Some(sender) => {
                // A send error just means no live receivers right now;
                // fire-and-forget delivery drops it like a real broker.
                let _ = sender.send(payload);
            }
            None => {
                debug!(subject, "publish to subject with no subscribers");
            }
        }
        Ok(())
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Relaxed);
    }
}
