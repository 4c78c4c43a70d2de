use async_trait::async_trait;
use tokio::sync::broadcast;

use super::errors::RealtimeError;
use crate::realtime::{RealtimeCommand, RealtimeEvent};

/// The process-wide realtime connection.
///
/// Owned by the application root, which calls `connect` on start and
/// `disconnect` on shutdown. Pages and cards only subscribe and emit.
#[async_trait]
pub trait RealtimePort: Send + Sync {
    async fn connect(&self) -> Result<(), RealtimeError>;

    async fn disconnect(&self) -> Result<(), RealtimeError>;

    fn is_connected(&self) -> bool;

    /// A fresh receiver; dropping it unsubscribes.
    fn subscribe(&self) -> broadcast::Receiver<RealtimeEvent>;

    async fn emit(&self, command: RealtimeCommand) -> Result<(), RealtimeError>;
}
