//! # Dispatcher Pipeline Integration
//!
//! Drives the full path (ingest, dedup, resolution, matching, fan-out)
//! through the real in-memory adapters, including two dispatcher replicas
//! sharing one lock store the way production replicas share the
//! distributed lock.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use rand::Rng;
    use tokio::time::timeout;
    use tokio_util::sync::CancellationToken;

    use msg_dispatch::{
        CachingResolver, Dispatcher, DispatcherConfig, Publisher, SubscriptionApi,
        SubscriptionMatcher,
    };
    use service_runtime::{
        MemoryActorRegistry, MemoryAddressMark, MemoryBus, MemoryDedupLock,
        MemorySubscriptionStore, ServiceConfig, ServiceContainer,
    };
    use shared_types::{
        Address, AppId, ExecutionEvent, ExecutionTrace, Message, MessageId, TipsetContext,
    };

    fn event(id: &str, from: &str, to: &str) -> ExecutionEvent {
        ExecutionEvent::new(
            TipsetContext::new(100, "bafy-state"),
            MessageId::from(id),
            Message::new(from, to),
        )
    }

    fn small_config() -> DispatcherConfig {
        DispatcherConfig {
            ingress_buffer: 32,
            worker_pool_size: 8,
            lock_lease_secs: 20,
        }
    }

    /// One replica wired against shared backends.
    fn replica(
        lock: Arc<MemoryDedupLock>,
        store: Arc<MemorySubscriptionStore>,
        filter: Arc<MemoryAddressMark>,
        bus: Arc<MemoryBus>,
    ) -> Arc<
        Dispatcher<
            MemoryDedupLock,
            CachingResolver<MemoryActorRegistry>,
            MemorySubscriptionStore,
            MemoryAddressMark,
            MemoryBus,
        >,
    > {
        let matcher = Arc::new(SubscriptionMatcher::new(store, filter));
        matcher.add_all(AppId::from("firehose"));
        let resolver = Arc::new(CachingResolver::new(Arc::new(MemoryActorRegistry::new())));
        let publisher = Arc::new(Publisher::new(bus));
        Arc::new(
            Dispatcher::new(small_config(), lock, resolver, matcher, publisher)
                .expect("valid config"),
        )
    }

    #[tokio::test]
    async fn test_two_replicas_deliver_once_per_identity() {
        let lock = Arc::new(MemoryDedupLock::new());
        let store = Arc::new(MemorySubscriptionStore::new());
        let filter = Arc::new(MemoryAddressMark::new());
        let bus = Arc::new(MemoryBus::new());

        let first = replica(lock.clone(), store.clone(), filter.clone(), bus.clone());
        let second = replica(lock, store, filter, bus.clone());

        // The host reports the same execution to both replicas.
        let cancel = CancellationToken::new();
        for n in 0..10 {
            let id = format!("bafy-{n}");
            first.ingest(&cancel, event(&id, "t1a", "t1b")).await.unwrap();
            second.ingest(&cancel, event(&id, "t1a", "t1b")).await.unwrap();
        }

        first.stop().await;
        second.stop().await;
        assert_eq!(bus.published(), 10, "each identity delivered exactly once");
    }

    #[tokio::test]
    async fn test_burst_through_container_delivers_everything() {
        let container = ServiceContainer::start(ServiceConfig {
            dispatcher: DispatcherConfig {
                ingress_buffer: 16,
                worker_pool_size: 4,
                lock_lease_secs: 0,
            },
            ..ServiceConfig::default()
        })
        .await
        .unwrap();

        let app = AppId::from("burst-app");
        container
            .subscriptions
            .subscribe(&app, &Address::from("t1hot"))
            .await
            .unwrap();
        let mut inbox = container.bus.subscribe("burst-app");

        let cancel = CancellationToken::new();
        let burst = rand::thread_rng().gen_range(150..250);
        for n in 0..burst {
            container
                .dispatcher
                .ingest(&cancel, event(&format!("bafy-{n}"), "t1cold", "t1hot"))
                .await
                .unwrap();
        }
        timeout(Duration::from_secs(10), container.stop())
            .await
            .expect("shutdown completes under load");

        let mut received = 0;
        while inbox.try_recv().is_ok() {
            received += 1;
        }
        assert_eq!(received, burst, "no event queued before stop may be lost");
        assert!(container.bus.is_closed());
    }

    #[tokio::test]
    async fn test_implicit_event_reaches_watchers_not_firehose() {
        let container = ServiceContainer::start(ServiceConfig::default()).await.unwrap();

        container
            .subscriptions
            .subscribe(&AppId::from("watcher"), &Address::from("t1sys"))
            .await
            .unwrap();
        container
            .subscriptions
            .subscribe_all(&AppId::from("firehose"))
            .await
            .unwrap();
        let mut watcher_inbox = container.bus.subscribe("watcher");
        let mut firehose_inbox = container.bus.subscribe("firehose");

        let cancel = CancellationToken::new();
        container
            .dispatcher
            .ingest(&cancel, event("bafy-cron", "t1sys", "t1sys").implicit(true))
            .await
            .unwrap();
        container.stop().await;

        assert!(watcher_inbox.try_recv().is_ok(), "address watcher notified");
        assert!(
            firehose_inbox.try_recv().is_err(),
            "subscribe-all suppressed for implicit messages"
        );
    }

    #[tokio::test]
    async fn test_subcall_only_match_via_resolved_address() {
        let container = ServiceContainer::start(ServiceConfig::default()).await.unwrap();

        // Watcher subscribes to an ID address; the matching traffic appears
        // only inside a sub-call, under the robust form.
        container.registry.assign(Address::from("t1vault"), Address::from("t0900"));
        container
            .subscriptions
            .subscribe(&AppId::from("vault-watch"), &Address::from("t0900"))
            .await
            .unwrap();
        let mut inbox = container.bus.subscribe("vault-watch");

        let root = Message::new("t1user", "t1router");
        let trace = ExecutionTrace::with_subcalls(
            root.clone(),
            vec![ExecutionTrace::with_subcalls(
                Message::new("t1router", "t1pool"),
                vec![ExecutionTrace::new(Message::new("t1pool", "t1vault"))],
            )],
        );
        let nested = ExecutionEvent::new(
            TipsetContext::new(7, "bafy-state"),
            MessageId::from("bafy-nested"),
            root,
        )
        .with_trace(trace);

        let cancel = CancellationToken::new();
        container.dispatcher.ingest(&cancel, nested).await.unwrap();
        container.stop().await;

        assert!(inbox.try_recv().is_ok(), "nested sub-call matched after resolution");
    }

    #[tokio::test]
    async fn test_cancelled_callers_leave_no_trace() {
        let container = ServiceContainer::start(ServiceConfig::default()).await.unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = container
            .dispatcher
            .ingest(&cancel, event("bafy-x", "t1a", "t1b"))
            .await;
        assert!(result.is_err());

        // The identity was never claimed: a later, healthy ingest succeeds.
        let healthy = CancellationToken::new();
        container
            .dispatcher
            .ingest(&healthy, event("bafy-x", "t1a", "t1b"))
            .await
            .unwrap();
        container.stop().await;
    }
}
