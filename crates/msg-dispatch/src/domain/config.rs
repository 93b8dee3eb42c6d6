//! Dispatcher configuration and validation.

use crate::error::ConfigError;

/// Events the drain loop pulls off the ingress queue per wakeup.
pub const DEFAULT_INGRESS_BUFFER: usize = 500;
/// Hard ceiling for the ingress batch size.
pub const MAX_INGRESS_BUFFER: usize = 1000;

/// Concurrent workers processing events.
pub const DEFAULT_WORKER_POOL: usize = 2000;
/// Hard ceiling for the worker pool.
pub const MAX_WORKER_POOL: usize = 3000;

/// Seconds a dedup-lock lease is held before the store expires it.
pub const DEFAULT_LOCK_LEASE_SECS: u32 = 20;
/// Hard ceiling for the lease.
pub const MAX_LOCK_LEASE_SECS: u32 = 7200;

/// Dispatcher tuning knobs.
///
/// All fields are clamped to hard maxima at construction; an
/// out-of-range value degrades to the ceiling rather than failing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// How many queued events the drain loop takes per wakeup. The ingress
    /// queue itself is unbounded; this only sizes the batch.
    pub ingress_buffer: usize,

    /// Maximum events processed concurrently. Once the pool is saturated
    /// the drain loop blocks, which is the pipeline's one deliberate
    /// backpressure point.
    pub worker_pool_size: usize,

    /// Dedup-lock lease in seconds. `0` means the lock is released by the
    /// worker as soon as the event finishes processing instead of waiting
    /// for the store to expire it, so a legitimately retried message
    /// (host crash, reorg) can be reprocessed immediately.
    pub lock_lease_secs: u32,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            ingress_buffer: DEFAULT_INGRESS_BUFFER,
            worker_pool_size: DEFAULT_WORKER_POOL,
            lock_lease_secs: DEFAULT_LOCK_LEASE_SECS,
        }
    }
}

impl DispatcherConfig {
    /// Reject configurations that cannot run at all.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_pool_size == 0 {
            return Err(ConfigError::ZeroWorkerPool);
        }
        if self.ingress_buffer == 0 {
            return Err(ConfigError::ZeroIngressBuffer);
        }
        Ok(())
    }

    /// Apply the hard ceilings.
    #[must_use]
    pub fn clamped(mut self) -> Self {
        self.ingress_buffer = self.ingress_buffer.min(MAX_INGRESS_BUFFER);
        self.worker_pool_size = self.worker_pool_size.min(MAX_WORKER_POOL);
        self.lock_lease_secs = self.lock_lease_secs.min(MAX_LOCK_LEASE_SECS);
        self
    }
}
