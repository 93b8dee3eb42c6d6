//! Wire envelope published to subscriber apps.

use crate::address::Address;
use crate::event::{ExecutionEvent, MessageId};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// The payload delivered to each matched app, one per event.
///
/// Self-contained: a subscriber needs no prior state to act on it, and may
/// re-derive anything heavier (receipts, full traces) from the chain using
/// `message_id`. Serialized once per event and shared across recipients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyEnvelope {
    /// Content-addressed message identity.
    pub message_id: MessageId,
    /// Epoch the message executed in.
    pub epoch: u64,
    /// State root the execution ran against.
    pub state_root: String,
    /// Sender of the top-level message.
    pub from: Address,
    /// Recipient of the top-level message.
    pub to: Address,
    pub method: u64,
    pub nonce: u64,
    pub value: u128,
    /// Number of sub-calls the execution made.
    pub subcalls: usize,
    /// Whether this was a system-internal message.
    pub implicit: bool,
}

impl NotifyEnvelope {
    pub fn from_event(event: &ExecutionEvent) -> Self {
        Self {
            message_id: event.message_id.clone(),
            epoch: event.tipset.epoch,
            state_root: event.tipset.parent_state_root.clone(),
            from: event.message.from.clone(),
            to: event.message.to.clone(),
            method: event.message.method,
            nonce: event.message.nonce,
            value: event.message.value,
            subcalls: event.subcall_count(),
            implicit: event.implicit,
        }
    }

    /// Serialize for the transport.
    pub fn to_bytes(&self) -> Result<Bytes, serde_json::Error> {
        serde_json::to_vec(self).map(Bytes::from)
    }
}
