//! Realtime channel adapters.

mod memory;
mod polling;

pub use memory::InMemoryRealtimeHub;
pub use polling::SocketIoPollingClient;
