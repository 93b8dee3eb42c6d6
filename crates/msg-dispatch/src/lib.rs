//! # Msg Dispatch - Execution-Event Fan-Out Engine
//!
//! Receives every message execution the host chain runtime reports,
//! decides which subscriber apps care about the addresses involved, and
//! publishes a notification per interested app over the pub/sub transport.
//!
//! ## Pipeline
//!
//! ```text
//! host runtime ──► Dispatcher::ingest ──► dedup lock ──► unbounded queue
//!                                                            │
//!                                                      bounded worker pool
//!                                                            │
//!                          flatten trace ► resolve addresses ► match ► publish
//! ```
//!
//! ## Guarantees
//!
//! - **At-most-once per message identity**: a distributed lock keyed on
//!   the message id absorbs the runtime's at-least-once reporting.
//! - **Implicit suppression**: system-internal messages are never
//!   broadcast to subscribe-all apps, only to address-specific watchers.
//! - **Non-blocking ingestion**: the caller pays for one lock round-trip
//!   and an unbounded enqueue; resolution, matching, and publishing all
//!   happen on the worker pool.
//! - **Graceful shutdown**: `stop` finishes every queued event before the
//!   transport connection is released.
//!
//! External collaborators (subscription store, existence filter, lock
//! store, identity registry, transport) are consumed through the traits in
//! [`ports`]; adapters live in the `service-runtime` crate.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

// Re-export main types
pub use domain::config::DispatcherConfig;
pub use error::{
    ConfigError, DispatchError, LockError, PublishError, RegistryError, ResolveError,
    StoreError, SubscribeError, TransportError,
};
pub use ports::{
    ActorRegistry, AddressResolver, DedupLock, ExecutionSink, ExistenceFilter, NotifyTransport,
    SubscriptionAdmin, SubscriptionApi, SubscriptionStore,
};
pub use service::{
    CachingResolver, Dispatcher, Publisher, SubscriptionMatcher, SubscriptionService,
};
