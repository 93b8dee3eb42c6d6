//! Chain addresses and subscriber identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A chain address in its canonical string form.
///
/// Two representations flow through the system: the *robust* form
/// (long-lived, derived from a key or actor code) and the *ID* form
/// (short, assigned by the chain's identity registry once the address
/// first appears in state). Both are carried as opaque strings; only the
/// registry can map one to the other.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this address is already in ID form.
    ///
    /// ID addresses start with the registry class digit `0` right after
    /// the one-character network prefix (e.g. `t0123`).
    #[must_use]
    pub fn is_id(&self) -> bool {
        let mut chars = self.0.chars();
        chars.next().is_some() && chars.next() == Some('0')
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Opaque identifier of a subscriber application.
///
/// Doubles as the pub/sub subject the app's notifications are published to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(String);

impl AppId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AppId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}
