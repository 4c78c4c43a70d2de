use async_trait::async_trait;

use super::errors::ApiError;
use crate::ids::MatchId;
use crate::marketplace::{Message, NewMessage};

#[async_trait]
pub trait MessagePort: Send + Sync {
    /// `POST /messages`.
    async fn send(&self, message: &NewMessage) -> Result<Message, ApiError>;

    /// `GET /messages/match/:id`.
    async fn thread(&self, match_id: &MatchId) -> Result<Vec<Message>, ApiError>;

    /// `PUT /messages/read/:id`.
    async fn mark_read(&self, match_id: &MatchId) -> Result<(), ApiError>;
}
