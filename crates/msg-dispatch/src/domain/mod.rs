//! Domain logic with no I/O dependencies.

pub mod config;

pub use config::DispatcherConfig;
