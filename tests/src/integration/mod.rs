//! Cross-crate integration flows.

pub mod pipeline;
