//! # Shared Types - Chainwatch Domain Model
//!
//! Types shared by every Chainwatch crate: chain addresses, applied-message
//! events with their execution traces, and the wire envelope delivered to
//! subscriber apps.
//!
//! Nothing in this crate does I/O. The dispatcher owns an [`ExecutionEvent`]
//! only for the duration of one pipeline pass; subscriptions reference
//! [`Address`] and [`AppId`] values that outlive any single event.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod address;
pub mod envelope;
pub mod event;
pub mod tipset;

// Re-export main types
pub use address::{Address, AppId};
pub use envelope::NotifyEnvelope;
pub use event::{ExecutionEvent, ExecutionTrace, Message, MessageId};
pub use tipset::TipsetContext;
