//! # Service Runtime - Chainwatch Wiring
//!
//! Concrete adapters for the dispatcher's ports and the container that
//! assembles them into a running service.
//!
//! The in-memory adapters mirror the production collaborators (shared
//! key/value lease store, bit-per-address existence mark, document store
//! of subscriptions, pub/sub broker) closely enough that the whole
//! pipeline can run single-process, which is also how the integration
//! suite exercises it. The one remote adapter, [`RpcActorRegistry`],
//! resolves addresses through an external full node when the service is
//! not co-located with chain state.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod container;
pub mod telemetry;

// Re-export main types
pub use adapters::{
    MemoryActorRegistry, MemoryAddressMark, MemoryBus, MemoryDedupLock,
    MemorySubscriptionStore, RpcActorRegistry,
};
pub use container::{MemoryDispatcher, ServiceConfig, ServiceContainer};
