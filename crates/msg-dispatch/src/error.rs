//! Error types for the dispatch subsystem.

use shared_types::Address;
use thiserror::Error;

/// Errors returned synchronously from event ingestion.
///
/// Anything that goes wrong *after* an event is queued (resolution,
/// matching, publishing) is logged by the worker and never surfaces here;
/// by then the host runtime has moved on.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Shutdown has begun; the caller must stop submitting events.
    #[error("dispatcher is closed")]
    Closed,

    /// The caller's context was cancelled before the event was queued.
    /// Transient; retry with a fresh context.
    #[error("ingest cancelled by caller")]
    Cancelled,

    /// The dedup lock store could not be reached. The event was not
    /// queued; the host's own retry is the only recovery path.
    #[error(transparent)]
    Lock(#[from] LockError),
}

/// Errors from the distributed dedup-lock store.
#[derive(Debug, Error)]
pub enum LockError {
    #[error("lock store unreachable: {0}")]
    Backend(String),
}

/// Errors from the subscription store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("subscription store query failed: {0}")]
    Backend(String),
}

/// Errors from the identity-registry lookup backing address resolution.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("identity registry lookup failed: {0}")]
    Backend(String),

    #[error("malformed address in registry response: {0}")]
    BadAddress(String),
}

/// Soft failure of address resolution; callers log it and continue with
/// the unresolved address.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("resolve {address}: {source}")]
    Lookup {
        address: Address,
        source: RegistryError,
    },
}

/// Errors from the pub/sub transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport publish failed: {0}")]
    Connection(String),

    #[error("transport is closed")]
    Closed,
}

/// Errors from the fan-out publisher.
///
/// Per-recipient transport failures are logged, not returned; only a
/// payload that cannot be encoded at all fails the call.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("encode notify payload: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors from subscription management.
#[derive(Debug, Error)]
pub enum SubscribeError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from dispatcher configuration validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("worker pool size must be positive")]
    ZeroWorkerPool,

    #[error("ingress buffer must be positive")]
    ZeroIngressBuffer,
}
