//! Port adapters connecting the dispatcher to concrete backends.

pub mod memory_bus;
pub mod memory_filter;
pub mod memory_lock;
pub mod memory_registry;
pub mod memory_store;
pub mod rpc_registry;

pub use memory_bus::MemoryBus;
pub use memory_filter::MemoryAddressMark;
pub use memory_lock::MemoryDedupLock;
pub use memory_registry::MemoryActorRegistry;
pub use memory_store::MemorySubscriptionStore;
pub use rpc_registry::RpcActorRegistry;
