//! In-memory dedup-lock leases.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use msg_dispatch::error::LockError;
use msg_dispatch::ports::DedupLock;
use std::time::{Duration, Instant};

/// Lease semantics of the shared key/value lock store, in process memory.
///
/// A lease of `0` never expires on its own and must be released by the
/// holder; a positive lease frees the key once the deadline passes, even
/// if the holder died.
#[derive(Default)]
pub struct MemoryDedupLock {
    /// key -> expiry deadline; `None` = held until released.
    leases: DashMap<String, Option<Instant>>,
}

impl MemoryDedupLock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys currently claimed (expired leases count until re-acquired).
    #[must_use]
    pub fn held(&self) -> usize {
        self.leases.len()
    }
}

#[async_trait]
impl DedupLock for MemoryDedupLock {
    async fn try_acquire(&self, key: &str, lease_secs: u32) -> Result<bool, LockError> {
        let now = Instant::now();
        let expiry = (lease_secs > 0).then(|| now + Duration::from_secs(u64::from(lease_secs)));

        match self.leases.entry(key.to_owned()) {
            Entry::Occupied(mut occupied) => {
                let live = match occupied.get() {
                    Some(deadline) => *deadline > now,
                    None => true,
                };
                if live {
                    return Ok(false);
                }
                occupied.insert(expiry);
                Ok(true)
            }
            Entry::Vacant(vacant) => {
                vacant.insert(expiry);
                Ok(true)
            }
        }
    }

    async fn release(&self, key: &str) -> bool {
        self.leases.remove(key).is_some()
    }
}
