use async_trait::async_trait;
use ag_core::ids::MatchId;
use ag_core::marketplace::{Match, MatchCommand, MatchSuggestion, NewMatch, SuggestionQuery};
use ag_core::ports::{ApiError, MatchPort};

use super::ApiClient;

#[async_trait]
impl MatchPort for ApiClient {
    async fn create_match(&self, new_match: &NewMatch) -> Result<Match, ApiError> {
        self.post_json("match", new_match).await
    }

    async fn apply(&self, id: &MatchId, command: &MatchCommand) -> Result<Match, ApiError> {
        let path = format!("match/{id}/{}", command.path_segment());
        match command {
            MatchCommand::AssignDriver(assignment) => self.post_json(&path, assignment).await,
            MatchCommand::Accept | MatchCommand::Cancel | MatchCommand::Complete => {
                self.post_json(&path, &serde_json::json!({})).await
            }
        }
    }

    async fn suggestions(&self, query: &SuggestionQuery) -> Result<Vec<MatchSuggestion>, ApiError> {
        self.get_json_with_query("matching/suggestions", &query.to_pairs())
            .await
    }
}
