//! The dispatcher core: ingestion, dedup, queueing, and the worker pool.
//!
//! ## Pipeline
//!
//! ```text
//! host runtime ──ingest()──► dedup lock ──► unbounded queue
//!                                               │
//!                                          drain loop
//!                                               │ (semaphore-bounded)
//!                                          worker tasks
//!                                               │
//!                              flatten ► resolve ► match ► publish
//! ```
//!
//! `ingest` never blocks the runtime's execution path beyond the lock
//! round-trip: the queue is unbounded and absorbs bursts, while the
//! semaphore in front of the workers bounds how much resolution and
//! publish work is in flight at once. When the pool is saturated the
//! drain loop stalls and the queue grows; that is the designed
//! backpressure point.
//!
//! ## Shutdown
//!
//! `stop` takes the ingress sender, so new `ingest` calls fail fast with
//! [`DispatchError::Closed`] while calls already past that gate finish
//! normally (they hold their own sender clones; the channel's write side
//! closes when the last one returns). The drain loop then sees the queue
//! close, drains what is left, joins every worker, and only then is the
//! transport connection released.

use parking_lot::{Mutex, RwLock};
use shared_types::{Address, AppId, ExecutionEvent, NotifyEnvelope};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::domain::DispatcherConfig;
use crate::error::{ConfigError, DispatchError};
use crate::ports::{
    AddressResolver, DedupLock, ExecutionSink, ExistenceFilter, NotifyTransport,
    SubscriptionStore,
};
use crate::service::matcher::SubscriptionMatcher;
use crate::service::publisher::Publisher;

/// Everything a worker needs to turn one event into notifications.
struct WorkerContext<L, R, S, F, T> {
    lock: Arc<L>,
    resolver: Arc<R>,
    matcher: Arc<SubscriptionMatcher<S, F>>,
    publisher: Arc<Publisher<T>>,
    lease_secs: u32,
}

impl<L, R, S, F, T> WorkerContext<L, R, S, F, T>
where
    L: DedupLock,
    R: AddressResolver,
    S: SubscriptionStore,
    F: ExistenceFilter,
    T: NotifyTransport + 'static,
{
    async fn process(&self, event: ExecutionEvent) {
        let app_ids = self.recipients(&event).await;
        if !app_ids.is_empty() {
            let envelope = NotifyEnvelope::from_event(&event);
            if let Err(err) = self.publisher.publish(&app_ids, &envelope).await {
                error!(message_id = %event.message_id, error = %err, "fan-out failed");
            }
        }
        // Lease 0 means "held until processing completes": release now so a
        // legitimate retry of this identity is not blocked until expiry.
        if self.lease_secs == 0 {
            self.lock.release(event.message_id.as_str()).await;
        }
    }

    /// Resolve every address the event touches and match subscriptions.
    async fn recipients(&self, event: &ExecutionEvent) -> Vec<AppId> {
        let mut addresses: Vec<Address> = Vec::new();
        let mut seen: HashSet<Address> = HashSet::new();
        for message in event.messages() {
            for address in [&message.from, &message.to] {
                let resolved = match self.resolver.resolve(&event.tipset, address).await {
                    Ok(resolved) => resolved,
                    Err(err) => {
                        // Soft failure: an unresolved address still matches
                        // subscriptions filed under its robust form.
                        warn!(error = %err, "matching on unresolved address");
                        address.clone()
                    }
                };
                if seen.insert(resolved.clone()) {
                    addresses.push(resolved);
                }
            }
        }

        let mut app_ids = self.matcher.match_addresses(&addresses).await;
        app_ids.extend(self.matcher.match_all(event.implicit));
        app_ids.sort_unstable();
        app_ids.dedup();
        app_ids
    }
}

/// The event ingestion front. See the module docs for the pipeline shape.
pub struct Dispatcher<L, R, S, F, T> {
    /// `Some` while open; taken by the first `stop` caller.
    ingress: RwLock<Option<mpsc::UnboundedSender<ExecutionEvent>>>,
    /// Drain-loop handle, awaited during shutdown.
    drain: Mutex<Option<JoinHandle<()>>>,
    worker: Arc<WorkerContext<L, R, S, F, T>>,
}

impl<L, R, S, F, T> Dispatcher<L, R, S, F, T>
where
    L: DedupLock + 'static,
    R: AddressResolver + 'static,
    S: SubscriptionStore + 'static,
    F: ExistenceFilter + 'static,
    T: NotifyTransport + 'static,
{
    /// Validate the config, clamp it, and start the drain loop.
    pub fn new(
        config: DispatcherConfig,
        lock: Arc<L>,
        resolver: Arc<R>,
        matcher: Arc<SubscriptionMatcher<S, F>>,
        publisher: Arc<Publisher<T>>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let config = config.clamped();

        let (tx, rx) = mpsc::unbounded_channel();
        let worker = Arc::new(WorkerContext {
            lock,
            resolver,
            matcher,
            publisher,
            lease_secs: config.lock_lease_secs,
        });
        let drain = tokio::spawn(Self::drain_loop(
            rx,
            config.ingress_buffer,
            config.worker_pool_size,
            Arc::clone(&worker),
        ));

        Ok(Self {
            ingress: RwLock::new(Some(tx)),
            drain: Mutex::new(Some(drain)),
            worker,
        })
    }

    /// Accept one applied message from the host runtime.
    ///
    /// Returns once the event is queued (or rejected); all heavy work
    /// happens on the worker pool. The dedup lock makes re-reports of the
    /// same message identity a successful no-op.
    pub async fn ingest(
        &self,
        cancel: &CancellationToken,
        event: ExecutionEvent,
    ) -> Result<(), DispatchError> {
        if cancel.is_cancelled() {
            return Err(DispatchError::Cancelled);
        }
        let sender = match &*self.ingress.read() {
            Some(sender) => sender.clone(),
            None => return Err(DispatchError::Closed),
        };

        let key = event.message_id.clone();
        if !self
            .worker
            .lock
            .try_acquire(key.as_str(), self.worker.lease_secs)
            .await?
        {
            debug!(message_id = %key, "message already claimed, skipping");
            return Ok(());
        }

        // Queue fully or not at all: undo the claim on either late exit so
        // a retried ingest can reprocess the identity.
        if cancel.is_cancelled() {
            self.worker.lock.release(key.as_str()).await;
            return Err(DispatchError::Cancelled);
        }
        if sender.send(event).is_err() {
            self.worker.lock.release(key.as_str()).await;
            return Err(DispatchError::Closed);
        }
        Ok(())
    }

    /// Whether shutdown has begun.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.ingress.read().is_none()
    }

    /// Drain the ingress queue into the bounded worker pool.
    async fn drain_loop(
        mut rx: mpsc::UnboundedReceiver<ExecutionEvent>,
        batch_size: usize,
        pool_size: usize,
        worker: Arc<WorkerContext<L, R, S, F, T>>,
    ) {
        let semaphore = Arc::new(Semaphore::new(pool_size));
        let mut tasks: JoinSet<()> = JoinSet::new();
        let mut batch = Vec::with_capacity(batch_size);

        'drain: loop {
            if rx.recv_many(&mut batch, batch_size).await == 0 {
                break; // queue closed and empty
            }
            for event in batch.drain(..) {
                // Keep the join set from accumulating finished tasks.
                while tasks.try_join_next().is_some() {}

                let permit = match Arc::clone(&semaphore).acquire_owned().await {
                    Ok(permit) => permit,
                    // The semaphore is never closed; bail rather than spin
                    // if that invariant is ever broken.
                    Err(_) => break 'drain,
                };
                let worker = Arc::clone(&worker);
                tasks.spawn(async move {
                    let _permit = permit;
                    worker.process(event).await;
                });
            }
        }

        while tasks.join_next().await.is_some() {}
        info!("dispatcher drain loop finished");
    }

    /// Graceful shutdown: refuse new events, let in-flight `ingest` calls
    /// finish, drain the queue, join every worker, close the transport.
    ///
    /// Idempotent and safe to call concurrently; the first caller performs
    /// the teardown, later callers return immediately.
    pub async fn stop(&self) {
        if self.ingress.write().take().is_none() {
            return;
        }
        info!("dispatcher stopping");

        let drain = self.drain.lock().take();
        if let Some(handle) = drain {
            if let Err(err) = handle.await {
                error!(error = %err, "drain loop task failed");
            }
        }
        self.worker.publisher.close();
        info!("dispatcher stopped");
    }
}

#[async_trait::async_trait]
impl<L, R, S, F, T> ExecutionSink for Dispatcher<L, R, S, F, T>
where
    L: DedupLock + 'static,
    R: AddressResolver + 'static,
    S: SubscriptionStore + 'static,
    F: ExistenceFilter + 'static,
    T: NotifyTransport + 'static,
{
    async fn message_applied(
        &self,
        cancel: &CancellationToken,
        event: ExecutionEvent,
    ) -> Result<(), DispatchError> {
        self.ingest(cancel, event).await
    }
}
