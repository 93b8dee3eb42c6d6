//! In-memory subscription store.

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use msg_dispatch::error::StoreError;
use msg_dispatch::ports::{SubscriptionAdmin, SubscriptionStore};
use shared_types::{Address, AppId};
use std::collections::HashSet;

/// Both sides of the subscription store (per-address watches and the
/// subscribe-all table) backed by concurrent maps.
#[derive(Default)]
pub struct MemorySubscriptionStore {
    by_address: DashMap<Address, HashSet<AppId>>,
    all: DashSet<AppId>,
}

impl MemorySubscriptionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriptionStore for MemorySubscriptionStore {
    async fn find_app_ids_by_addresses(
        &self,
        addresses: &[Address],
    ) -> Result<Vec<AppId>, StoreError> {
        let mut out = Vec::new();
        for address in addresses {
            if let Some(apps) = self.by_address.get(address) {
                out.extend(apps.iter().cloned());
            }
        }
        Ok(out)
    }

    async fn list_all_subscribers(&self) -> Result<Vec<AppId>, StoreError> {
        Ok(self.all.iter().map(|id| id.key().clone()).collect())
    }
}

#[async_trait]
impl SubscriptionAdmin for MemorySubscriptionStore {
    async fn add_subscription(&self, app_id: &AppId, address: &Address) -> Result<(), StoreError> {
        self.by_address
            .entry(address.clone())
            .or_default()
            .insert(app_id.clone());
        Ok(())
    }

    async fn remove_subscription(
        &self,
        app_id: &AppId,
        address: &Address,
    ) -> Result<(), StoreError> {
        if let Some(mut apps) = self.by_address.get_mut(address) {
            apps.remove(app_id);
        }
        Ok(())
    }

    async fn add_all_subscriber(&self, app_id: &AppId) -> Result<(), StoreError> {
        self.all.insert(app_id.clone());
        Ok(())
    }

    async fn remove_all_subscriber(&self, app_id: &AppId) -> Result<(), StoreError> {
        self.all.remove(app_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_batched_find_spans_addresses() {
        let store = MemorySubscriptionStore::new();
        store
            .add_subscription(&AppId::from("app1"), &Address::from("t1a"))
            .await
            .unwrap();
        store
            .add_subscription(&AppId::from("app2"), &Address::from("t1b"))
            .await
            .unwrap();

        let found = store
            .find_app_ids_by_addresses(&[Address::from("t1a"), Address::from("t1b")])
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn test_remove_subscription() {
        let store = MemorySubscriptionStore::new();
        let app = AppId::from("app1");
        let address = Address::from("t1a");
        store.add_subscription(&app, &address).await.unwrap();
        store.remove_subscription(&app, &address).await.unwrap();

        let found = store
            .find_app_ids_by_addresses(std::slice::from_ref(&address))
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_all_subscriber_table() {
        let store = MemorySubscriptionStore::new();
        store.add_all_subscriber(&AppId::from("app1")).await.unwrap();
        store.add_all_subscriber(&AppId::from("app1")).await.unwrap();
        assert_eq!(store.list_all_subscribers().await.unwrap().len(), 1);

        store
            .remove_all_subscriber(&AppId::from("app1"))
            .await
            .unwrap();
        assert!(store.list_all_subscribers().await.unwrap().is_empty());
    }
}
