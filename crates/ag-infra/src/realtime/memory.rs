use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

use ag_core::ports::{RealtimeError, RealtimePort};
use ag_core::realtime::{RealtimeCommand, RealtimeEvent};

/// Loopback realtime channel.
///
/// Used when no socket URL is configured and by tests that need to push
/// events by hand.
pub struct InMemoryRealtimeHub {
    events: broadcast::Sender<RealtimeEvent>,
    connected: AtomicBool,
    emitted: Mutex<Vec<RealtimeCommand>>,
}

impl Default for InMemoryRealtimeHub {
    fn default() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            events,
            connected: AtomicBool::new(false),
            emitted: Mutex::new(Vec::new()),
        }
    }
}

impl InMemoryRealtimeHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `event` to every subscriber. Returns the receiver count.
    pub fn publish(&self, event: RealtimeEvent) -> usize {
        self.events.send(event).unwrap_or(0)
    }

    /// Commands emitted so far, oldest first.
    pub fn emitted(&self) -> Vec<RealtimeCommand> {
        self.emitted_guard().clone()
    }

    fn emitted_guard(&self) -> MutexGuard<'_, Vec<RealtimeCommand>> {
        self.emitted
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl RealtimePort for InMemoryRealtimeHub {
    async fn connect(&self) -> Result<(), RealtimeError> {
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), RealtimeError> {
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn subscribe(&self) -> broadcast::Receiver<RealtimeEvent> {
        self.events.subscribe()
    }

    async fn emit(&self, command: RealtimeCommand) -> Result<(), RealtimeError> {
        if !self.is_connected() {
            return Err(RealtimeError::NotConnected);
        }
        debug!(command = command.name(), "loopback emit");
        self.emitted_guard().push(command);
        Ok(())
    }
}
