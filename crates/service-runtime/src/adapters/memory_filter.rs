//! In-memory existence filter.

use async_trait::async_trait;
use dashmap::DashSet;
use msg_dispatch::ports::ExistenceFilter;
use shared_types::Address;

/// Exact membership mark per address, the in-process stand-in for the
/// shared bit-per-address store.
#[derive(Default)]
pub struct MemoryAddressMark {
    marked: DashSet<Address>,
}

impl MemoryAddressMark {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn marked(&self) -> usize {
        self.marked.len()
    }
}

#[async_trait]
impl ExistenceFilter for MemoryAddressMark {
    async fn might_be_subscribed(&self, address: &Address) -> bool {
        self.marked.contains(address)
    }

    async fn mark_subscribed(&self, address: &Address) -> bool {
        self.marked.insert(address.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mark_then_check() {
        let filter = MemoryAddressMark::new();
        let address = Address::from("t1alice");

        assert!(!filter.might_be_subscribed(&address).await);
        assert!(filter.mark_subscribed(&address).await, "first mark is new");
        assert!(!filter.mark_subscribed(&address).await, "second mark is not");
        assert!(filter.might_be_subscribed(&address).await);
    }
}
