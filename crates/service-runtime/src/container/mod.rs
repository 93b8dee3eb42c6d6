//! Dependency wiring for a single-process Chainwatch service.

use anyhow::{Context, Result};
use msg_dispatch::{
    CachingResolver, Dispatcher, DispatcherConfig, Publisher, SubscriptionMatcher,
    SubscriptionService,
};
use std::sync::Arc;
use tracing::info;

use crate::adapters::{
    memory_bus::DEFAULT_SUBJECT_CAPACITY, MemoryActorRegistry, MemoryAddressMark, MemoryBus,
    MemoryDedupLock, MemorySubscriptionStore,
};

/// Service-level configuration: dispatcher knobs plus transport sizing.
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub dispatcher: DispatcherConfig,
    /// Payloads buffered per transport subject before slow consumers lag.
    pub subject_capacity: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            dispatcher: DispatcherConfig::default(),
            subject_capacity: DEFAULT_SUBJECT_CAPACITY,
        }
    }
}

/// The dispatcher as assembled by this container.
pub type MemoryDispatcher = Dispatcher<
    MemoryDedupLock,
    CachingResolver<MemoryActorRegistry>,
    MemorySubscriptionStore,
    MemoryAddressMark,
    MemoryBus,
>;

/// All wired components of a running service.
///
/// Construction order follows the dependency graph: stores and transport
/// first, matcher seeded from the persisted subscribe-all set, dispatcher
/// last so it never observes a half-wired world.
pub struct ServiceContainer {
    pub dispatcher: Arc<MemoryDispatcher>,
    pub subscriptions: Arc<SubscriptionService<MemorySubscriptionStore, MemoryAddressMark>>,
    pub bus: Arc<MemoryBus>,
    pub registry: Arc<MemoryActorRegistry>,
}

impl ServiceContainer {
    /// Assemble and start a service with in-memory backends.
    pub async fn start(config: ServiceConfig) -> Result<Self> {
        let store = Arc::new(MemorySubscriptionStore::new());
        let filter = Arc::new(MemoryAddressMark::new());
        let lock = Arc::new(MemoryDedupLock::new());
        let registry = Arc::new(MemoryActorRegistry::new());
        let bus = Arc::new(MemoryBus::with_capacity(config.subject_capacity));

        let matcher = Arc::new(SubscriptionMatcher::new(store.clone(), filter.clone()));
        let subscriptions = Arc::new(SubscriptionService::new(
            store.clone(),
            filter,
            matcher.clone(),
        ));
        let seeded = subscriptions
            .seed_matcher()
            .await
            .context("seed subscribe-all set")?;

        let resolver = Arc::new(CachingResolver::new(registry.clone()));
        let publisher = Arc::new(Publisher::new(bus.clone()));
        let dispatcher = Arc::new(
            Dispatcher::new(config.dispatcher, lock, resolver, matcher, publisher)
                .context("start dispatcher")?,
        );

        info!(seeded, "service container started");
        Ok(Self {
            dispatcher,
            subscriptions,
            bus,
            registry,
        })
    }

    /// Drain and shut down the dispatcher; the transport closes last.
    pub async fn stop(&self) {
        self.dispatcher.stop().await;
    }
}
