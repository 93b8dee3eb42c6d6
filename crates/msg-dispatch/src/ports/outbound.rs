//! Outbound ports (driven side): external stores and the transport.

use async_trait::async_trait;
use bytes::Bytes;
use shared_types::{Address, AppId, TipsetContext};

use crate::error::{LockError, RegistryError, ResolveError, StoreError, TransportError};

/// Short-lived mutual-exclusion lease keyed by message identity.
///
/// This is the idempotence boundary: the host runtime reports executions
/// at-least-once, and whoever holds the lease for an identity is the only
/// party allowed to process it.
#[async_trait]
pub trait DedupLock: Send + Sync {
    /// Try to claim `key` for `lease_secs` seconds.
    ///
    /// `Ok(true)` means claimed; `Ok(false)` means someone else holds it
    /// (not an error, the event is already being handled). A lease of `0`
    /// never expires on its own and must be released explicitly.
    async fn try_acquire(&self, key: &str, lease_secs: u32) -> Result<bool, LockError>;

    /// Drop the claim on `key`. Returns whether a claim existed.
    async fn release(&self, key: &str) -> bool;
}

/// Read side of the subscription store.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// All apps subscribed to any of the given addresses, one batched
    /// query. Duplicates across addresses may be returned; callers dedup.
    async fn find_app_ids_by_addresses(
        &self,
        addresses: &[Address],
    ) -> Result<Vec<AppId>, StoreError>;

    /// All apps with a subscribe-all subscription. Used once at startup to
    /// seed the in-process set.
    async fn list_all_subscribers(&self) -> Result<Vec<AppId>, StoreError>;
}

/// Write side of the subscription store, used by the service layer.
#[async_trait]
pub trait SubscriptionAdmin: Send + Sync {
    async fn add_subscription(&self, app_id: &AppId, address: &Address)
        -> Result<(), StoreError>;

    async fn remove_subscription(
        &self,
        app_id: &AppId,
        address: &Address,
    ) -> Result<(), StoreError>;

    async fn add_all_subscriber(&self, app_id: &AppId) -> Result<(), StoreError>;

    async fn remove_all_subscriber(&self, app_id: &AppId) -> Result<(), StoreError>;
}

/// Exact pre-filter answering "could this address have any subscriber?".
///
/// Backed by a shared bit-per-address store in production. Most chain
/// traffic touches addresses nobody watches, so a `false` here saves a
/// store round-trip per event. Backend failures degrade to `false`;
/// a missed notification is preferable to blocking the pipeline.
#[async_trait]
pub trait ExistenceFilter: Send + Sync {
    async fn might_be_subscribed(&self, address: &Address) -> bool;

    /// Flag an address as subscribed. Returns whether the flag was newly
    /// set. The flag is never cleared: another app may still watch the
    /// address, and a stale `true` only costs one store query.
    async fn mark_subscribed(&self, address: &Address) -> bool;
}

/// Identity-registry lookup at a given chain state.
///
/// Two interchangeable strategies implement this: reading the registry
/// actor out of co-located chain state, or asking a remote full node over
/// RPC. Resolution is a pure function of (state root, address).
#[async_trait]
pub trait ActorRegistry: Send + Sync {
    /// The ID address assigned to `address`, or `None` if the address has
    /// not appeared on chain yet.
    async fn lookup_id(
        &self,
        tipset: &TipsetContext,
        address: &Address,
    ) -> Result<Option<Address>, RegistryError>;
}

/// Address resolution with caching on top of an [`ActorRegistry`].
#[async_trait]
pub trait AddressResolver: Send + Sync {
    /// Canonical (ID) form of `address` at the given tipset.
    ///
    /// On failure callers fall back to the address they already have:
    /// an address that never transacted has no ID form yet, and matching
    /// on the robust form is still correct.
    async fn resolve(
        &self,
        tipset: &TipsetContext,
        address: &Address,
    ) -> Result<Address, ResolveError>;
}

/// Publish primitive of the pub/sub broker.
#[async_trait]
pub trait NotifyTransport: Send + Sync {
    async fn publish(&self, subject: &str, payload: Bytes) -> Result<(), TransportError>;

    /// Release the connection. Only called once all in-flight publishes
    /// have completed.
    fn close(&self);
}
