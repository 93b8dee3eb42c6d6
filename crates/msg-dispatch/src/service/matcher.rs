//! Subscription matching with the existence-filter short-circuit.

use dashmap::DashSet;
use shared_types::{Address, AppId};
use std::sync::Arc;
use tracing::{debug, error};

use crate::ports::{ExistenceFilter, SubscriptionStore};

/// Matches the addresses an event touches against per-address
/// subscriptions, and tracks the in-process subscribe-all set.
///
/// The subscribe-all set is the only dispatcher-owned mutable state that
/// outlives a single event. It is a concurrent set: the API layer mutates
/// it while workers iterate it at chain speed.
pub struct SubscriptionMatcher<S, F> {
    store: Arc<S>,
    filter: Arc<F>,
    all_ids: DashSet<AppId>,
}

impl<S, F> SubscriptionMatcher<S, F>
where
    S: SubscriptionStore,
    F: ExistenceFilter,
{
    pub fn new(store: Arc<S>, filter: Arc<F>) -> Self {
        Self {
            store,
            filter,
            all_ids: DashSet::new(),
        }
    }

    /// Replace nothing, just insert: used at startup to load the persisted
    /// subscribe-all set.
    pub fn seed_all(&self, app_ids: impl IntoIterator<Item = AppId>) {
        for id in app_ids {
            self.all_ids.insert(id);
        }
    }

    pub fn add_all(&self, app_id: AppId) {
        self.all_ids.insert(app_id);
    }

    pub fn remove_all(&self, app_id: &AppId) {
        self.all_ids.remove(app_id);
    }

    #[must_use]
    pub fn all_count(&self) -> usize {
        self.all_ids.len()
    }

    /// Apps subscribed to any of `addresses`, deduped.
    ///
    /// The existence filter is consulted first; when it clears every
    /// address the store is not queried at all, which is the common case
    /// for chain traffic. A store failure is logged and degrades to "no
    /// matches" rather than stalling the pipeline.
    pub async fn match_addresses(&self, addresses: &[Address]) -> Vec<AppId> {
        let mut flagged = false;
        for address in addresses {
            if self.filter.might_be_subscribed(address).await {
                flagged = true;
                break;
            }
        }
        if !flagged {
            return Vec::new();
        }

        let mut app_ids = match self.store.find_app_ids_by_addresses(addresses).await {
            Ok(list) => list,
            Err(err) => {
                error!(error = %err, "subscription lookup failed, treating as no matches");
                return Vec::new();
            }
        };
        app_ids.sort_unstable();
        app_ids.dedup();
        debug!(matched = app_ids.len(), "address subscriptions matched");
        app_ids
    }

    /// The subscribe-all set, or nothing for implicit messages: system
    /// housekeeping must not flood watch-everything subscribers.
    pub fn match_all(&self, implicit: bool) -> Vec<AppId> {
        if implicit {
            return Vec::new();
        }
        self.all_ids.iter().map(|id| id.key().clone()).collect()
    }
}
