//! Messages page: per-match threads outside of list cards.

use std::sync::Arc;

use tracing::{debug, info_span, Instrument};

use ag_core::ids::MatchId;
use ag_core::marketplace::{Message, NewMessage};
use ag_core::ports::{ApiError, MessagePort};

pub struct MatchThread {
    messages: Arc<dyn MessagePort>,
}

impl MatchThread {
    pub fn new(messages: Arc<dyn MessagePort>) -> Self {
        Self { messages }
    }

    /// Loads the thread and marks it read.
    pub async fn open(&self, match_id: &MatchId) -> Result<Vec<Message>, ApiError> {
        let span = info_span!("usecase.match_thread.open", match_id = %match_id);
        async move {
            let thread = self.messages.thread(match_id).await?;
            if thread.iter().any(|m| !m.read) {
                self.messages.mark_read(match_id).await?;
            }
            debug!(count = thread.len(), "thread loaded");
            Ok(thread)
        }
        .instrument(span)
        .await
    }

    /// Blank content sends nothing and returns `Ok(None)`.
    pub async fn send(&self, match_id: &MatchId, content: &str) -> Result<Option<Message>, ApiError> {
        let Some(message) = NewMessage::new(match_id.clone(), content) else {
            return Ok(None);
        };
        self.messages.send(&message).await.map(Some)
    }
}
