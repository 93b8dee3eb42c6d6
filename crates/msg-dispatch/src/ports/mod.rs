//! Ports (hexagonal boundary) of the dispatch subsystem.
//!
//! Inbound ports are what the host runtime and the API layer call;
//! outbound ports are what the subsystem needs from external stores and
//! the transport. Adapters live in `service-runtime`.

pub mod inbound;
pub mod outbound;

pub use inbound::{ExecutionSink, SubscriptionApi};
pub use outbound::{
    ActorRegistry, AddressResolver, DedupLock, ExistenceFilter, NotifyTransport,
    SubscriptionAdmin, SubscriptionStore,
};
