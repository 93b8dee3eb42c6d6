//! Applied-message events and their execution traces.

use crate::address::Address;
use crate::tipset::TipsetContext;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Content-addressed identity of one top-level message.
///
/// The host runtime may report the same identity more than once (retries,
/// re-execution on reorg); the dedup lock is keyed on this value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// One chain message, top-level or sub-call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub from: Address,
    pub to: Address,
    pub method: u64,
    pub nonce: u64,
    pub value: u128,
}

impl Message {
    pub fn new(from: impl Into<Address>, to: impl Into<Address>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            ..Default::default()
        }
    }
}

/// The call tree produced while executing one top-level message.
///
/// Each node carries the message that invoked it and the sub-calls it made
/// in turn. Depth and fan-out are unbounded in principle and bounded in
/// practice by the chain's gas limits.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionTrace {
    pub message: Message,
    pub subcalls: Vec<ExecutionTrace>,
}

impl ExecutionTrace {
    pub fn new(message: Message) -> Self {
        Self {
            message,
            subcalls: Vec::new(),
        }
    }

    pub fn with_subcalls(message: Message, subcalls: Vec<ExecutionTrace>) -> Self {
        Self { message, subcalls }
    }

    /// Every message in the tree, root first.
    ///
    /// Iterative with an explicit work-list: a deeply nested trace must not
    /// be able to blow the stack. Order beyond "root first" is unspecified;
    /// consumers match on address sets, not sequence.
    pub fn flatten(&self) -> Vec<&Message> {
        let mut out = Vec::new();
        let mut work = vec![self];
        while let Some(node) = work.pop() {
            out.push(&node.message);
            work.extend(node.subcalls.iter());
        }
        out
    }
}

/// One message execution as reported by the host runtime.
///
/// Immutable once constructed; owned by the dispatcher for the duration of
/// one pipeline pass and dropped afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionEvent {
    /// Tipset the message executed in.
    pub tipset: TipsetContext,
    /// Content-addressed message identity; dedup key.
    pub message_id: MessageId,
    /// The top-level message.
    pub message: Message,
    /// Call tree of the execution, when the runtime captured one. The root
    /// node carries the top-level message again.
    pub trace: Option<ExecutionTrace>,
    /// System-internal message (cron tick and friends). Implicit messages
    /// are withheld from subscribe-all delivery.
    pub implicit: bool,
}

impl ExecutionEvent {
    pub fn new(tipset: TipsetContext, message_id: MessageId, message: Message) -> Self {
        Self {
            tipset,
            message_id,
            message,
            trace: None,
            implicit: false,
        }
    }

    #[must_use]
    pub fn with_trace(mut self, trace: ExecutionTrace) -> Self {
        self.trace = Some(trace);
        self
    }

    #[must_use]
    pub fn implicit(mut self, implicit: bool) -> Self {
        self.implicit = implicit;
        self
    }

    /// All messages this event touches: the flattened trace when present
    /// (whose root is the top-level message), otherwise just the top-level
    /// message.
    pub fn messages(&self) -> Vec<&Message> {
        match &self.trace {
            Some(trace) => trace.flatten(),
            None => vec![&self.message],
        }
    }

    /// Number of sub-calls below the top-level message.
    #[must_use]
    pub fn subcall_count(&self) -> usize {
        self.messages().len().saturating_sub(1)
    }
}
