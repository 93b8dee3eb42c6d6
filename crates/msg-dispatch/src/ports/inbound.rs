//! Inbound ports (driving side): the host runtime hook and the
//! subscription management API.

use async_trait::async_trait;
use shared_types::{Address, AppId, ExecutionEvent};
use tokio_util::sync::CancellationToken;

use crate::error::{DispatchError, SubscribeError};

/// The hook the host runtime invokes once per executed message.
///
/// Called synchronously on the runtime's execution path, possibly many
/// times per second; implementations must return as soon as the event is
/// queued (or rejected) and never wait for downstream processing.
#[async_trait]
pub trait ExecutionSink: Send + Sync {
    async fn message_applied(
        &self,
        cancel: &CancellationToken,
        event: ExecutionEvent,
    ) -> Result<(), DispatchError>;
}

/// Subscription management, called by the surrounding API layer.
#[async_trait]
pub trait SubscriptionApi: Send + Sync {
    /// Watch one address for `app_id`.
    async fn subscribe(&self, app_id: &AppId, address: &Address) -> Result<(), SubscribeError>;

    /// Stop watching one address.
    async fn cancel(&self, app_id: &AppId, address: &Address) -> Result<(), SubscribeError>;

    /// Receive every non-implicit event regardless of address.
    async fn subscribe_all(&self, app_id: &AppId) -> Result<(), SubscribeError>;

    /// Leave the subscribe-all set.
    async fn cancel_all(&self, app_id: &AppId) -> Result<(), SubscribeError>;
}
