//! Adapters for the AgriLink ports: REST over reqwest, Socket.IO over
//! long-polling, layered configuration, image encoding.

pub mod codec;
pub mod config;
pub mod http;
pub mod media;
pub mod notify;
pub mod realtime;
pub mod session;

pub use http::ApiClient;
pub use media::FileImageEncoder;
pub use notify::TracingNotifier;
pub use realtime::{InMemoryRealtimeHub, SocketIoPollingClient};
pub use session::StaticSession;
