use async_trait::async_trait;

use super::errors::ApiError;
use crate::ids::MatchId;
use crate::marketplace::{Match, MatchCommand, MatchSuggestion, NewMatch, SuggestionQuery};

#[async_trait]
pub trait MatchPort: Send + Sync {
    /// `POST /match`.
    async fn create_match(&self, new_match: &NewMatch) -> Result<Match, ApiError>;

    /// `POST /match/:id/{accept,cancel,assign-driver,complete}`.
    async fn apply(&self, id: &MatchId, command: &MatchCommand) -> Result<Match, ApiError>;

    /// `GET /matching/suggestions`.
    async fn suggestions(&self, query: &SuggestionQuery) -> Result<Vec<MatchSuggestion>, ApiError>;
}
