//! Tipset context attached to every applied message.

use serde::{Deserialize, Serialize};

/// The slice of tipset state the dispatcher needs.
///
/// Address resolution loads the identity registry at the *parent* state
/// root: that is the state the message executed against. The full tipset
/// (block headers, weights) stays with the host runtime.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TipsetContext {
    /// Chain epoch of the tipset the message executed in.
    pub epoch: u64,
    /// State root the tipset's messages executed against.
    pub parent_state_root: String,
}

impl TipsetContext {
    pub fn new(epoch: u64, parent_state_root: impl Into<String>) -> Self {
        Self {
            epoch,
            parent_state_root: parent_state_root.into(),
        }
    }
}
