//! Caching address resolution on top of an identity-registry lookup.

use async_trait::async_trait;
use dashmap::DashMap;
use shared_types::{Address, TipsetContext};
use std::sync::Arc;
use tracing::trace;

use crate::error::ResolveError;
use crate::ports::{ActorRegistry, AddressResolver};

/// Resolves robust addresses to their registry-assigned ID form, caching
/// every successful resolution for the life of the process.
///
/// An ID assignment never changes once made, so entries never need
/// invalidation. The cache is deliberately unbounded: the set of addresses
/// actually seen by one deployment is small against available memory, and
/// an eviction policy would re-introduce registry round-trips for the
/// hottest addresses.
pub struct CachingResolver<R> {
    registry: Arc<R>,
    cache: DashMap<Address, Address>,
}

impl<R: ActorRegistry> CachingResolver<R> {
    pub fn new(registry: Arc<R>) -> Self {
        Self {
            registry,
            cache: DashMap::new(),
        }
    }

    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

#[async_trait]
impl<R: ActorRegistry> AddressResolver for CachingResolver<R> {
    async fn resolve(
        &self,
        tipset: &TipsetContext,
        address: &Address,
    ) -> Result<Address, ResolveError> {
        if let Some(hit) = self.cache.get(address) {
            trace!(address = %address, id = %hit.value(), "resolver cache hit");
            return Ok(hit.value().clone());
        }

        match self.registry.lookup_id(tipset, address).await {
            Ok(Some(id)) => {
                self.cache.insert(address.clone(), id.clone());
                Ok(id)
            }
            // Not in the registry yet: probably the address's first
            // transaction. The robust form is the canonical one for now,
            // and must not be cached in case the registry learns of it
            // at a later tipset.
            Ok(None) => Ok(address.clone()),
            Err(source) => Err(ResolveError::Lookup {
                address: address.clone(),
                source,
            }),
        }
    }
}
