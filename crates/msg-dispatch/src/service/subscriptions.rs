//! Subscription management: the service layer mutating what the
//! dispatcher reads.

use async_trait::async_trait;
use shared_types::{Address, AppId};
use std::sync::Arc;
use tracing::info;

use crate::error::SubscribeError;
use crate::ports::{ExistenceFilter, SubscriptionAdmin, SubscriptionApi, SubscriptionStore};
use crate::service::matcher::SubscriptionMatcher;

/// Persists subscription changes and keeps the dispatcher's in-process
/// state (existence filter, subscribe-all set) in step with them.
pub struct SubscriptionService<S, F> {
    store: Arc<S>,
    filter: Arc<F>,
    matcher: Arc<SubscriptionMatcher<S, F>>,
}

impl<S, F> SubscriptionService<S, F>
where
    S: SubscriptionStore + SubscriptionAdmin,
    F: ExistenceFilter,
{
    pub fn new(store: Arc<S>, filter: Arc<F>, matcher: Arc<SubscriptionMatcher<S, F>>) -> Self {
        Self {
            store,
            filter,
            matcher,
        }
    }

    /// Load the persisted subscribe-all set into the matcher. Called once
    /// at startup, before the dispatcher sees its first event.
    pub async fn seed_matcher(&self) -> Result<usize, SubscribeError> {
        let app_ids = self.store.list_all_subscribers().await?;
        let count = app_ids.len();
        self.matcher.seed_all(app_ids);
        info!(subscribers = count, "seeded subscribe-all set");
        Ok(count)
    }
}

#[async_trait]
impl<S, F> SubscriptionApi for SubscriptionService<S, F>
where
    S: SubscriptionStore + SubscriptionAdmin,
    F: ExistenceFilter,
{
    async fn subscribe(&self, app_id: &AppId, address: &Address) -> Result<(), SubscribeError> {
        self.store.add_subscription(app_id, address).await?;
        self.filter.mark_subscribed(address).await;
        info!(app_id = %app_id, address = %address, "subscription added");
        Ok(())
    }

    async fn cancel(&self, app_id: &AppId, address: &Address) -> Result<(), SubscribeError> {
        // The existence-filter flag stays set: other apps may watch the
        // same address, and a stale flag only costs one store query.
        self.store.remove_subscription(app_id, address).await?;
        info!(app_id = %app_id, address = %address, "subscription cancelled");
        Ok(())
    }

    async fn subscribe_all(&self, app_id: &AppId) -> Result<(), SubscribeError> {
        self.store.add_all_subscriber(app_id).await?;
        self.matcher.add_all(app_id.clone());
        info!(app_id = %app_id, "subscribe-all added");
        Ok(())
    }

    async fn cancel_all(&self, app_id: &AppId) -> Result<(), SubscribeError> {
        self.store.remove_all_subscriber(app_id).await?;
        self.matcher.remove_all(app_id);
        info!(app_id = %app_id, "subscribe-all removed");
        Ok(())
    }
}
