use async_trait::async_trait;

use super::errors::ApiError;
use crate::ids::{MatchId, TransportId, UserId};
use crate::marketplace::{TransportOffer, TransportSuggestion};

/// Transport endpoints beyond plain CRUD.
#[async_trait]
pub trait TransportPort: Send + Sync {
    /// `GET /transport/driver/:id`.
    async fn by_driver(&self, driver: &UserId) -> Result<Vec<TransportOffer>, ApiError>;

    /// `GET /transport/suggest/:matchId`.
    async fn suggest_for_match(&self, match_id: &MatchId)
        -> Result<Vec<TransportSuggestion>, ApiError>;

    /// `POST /transport/:id/views`.
    async fn increment_views(&self, id: &TransportId) -> Result<(), ApiError>;
}
