//! In-memory identity registry.

use async_trait::async_trait;
use dashmap::DashMap;
use msg_dispatch::error::RegistryError;
use msg_dispatch::ports::ActorRegistry;
use shared_types::{Address, TipsetContext};

/// The co-located strategy's seam: a robust-to-ID table fed from local
/// chain state. Also the registry the test suite drives directly.
#[derive(Default)]
pub struct MemoryActorRegistry {
    assigned: DashMap<Address, Address>,
}

impl MemoryActorRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an ID assignment, as the registry actor would on an
    /// address's first on-chain appearance.
    pub fn assign(&self, robust: Address, id: Address) {
        self.assigned.insert(robust, id);
    }
}

#[async_trait]
impl ActorRegistry for MemoryActorRegistry {
    async fn lookup_id(
        &self,
        _tipset: &TipsetContext,
        address: &Address,
    ) -> Result<Option<Address>, RegistryError> {
        // An ID address is already canonical.
        if address.is_id() {
            return Ok(Some(address.clone()));
        }
        Ok(self.assigned.get(address).map(|id| id.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_assigned_address_resolves() {
        let registry = MemoryActorRegistry::new();
        registry.assign(Address::from("t1alice"), Address::from("t0101"));

        let id = registry
            .lookup_id(&TipsetContext::default(), &Address::from("t1alice"))
            .await
            .unwrap();
        assert_eq!(id, Some(Address::from("t0101")));
    }

    #[tokio::test]
    async fn test_unassigned_address_is_none() {
        let registry = MemoryActorRegistry::new();
        let id = registry
            .lookup_id(&TipsetContext::default(), &Address::from("t1ghost"))
            .await
            .unwrap();
        assert_eq!(id, None);
    }

    #[tokio::test]
    async fn test_id_address_short_circuits() {
        let registry = MemoryActorRegistry::new();
        let id = registry
            .lookup_id(&TipsetContext::default(), &Address::from("t0123"))
            .await
            .unwrap();
        assert_eq!(id, Some(Address::from("t0123")));
    }
}
