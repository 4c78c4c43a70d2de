//! Match lifecycle: propose, accept, cancel, assign a driver, complete, and
//! ask the server-side matcher for suggestions.

use std::sync::Arc;

use tracing::{info, info_span, Instrument};

use ag_core::ids::MatchId;
use ag_core::marketplace::{Match, MatchCommand, MatchSuggestion, NewMatch, SuggestionQuery};
use ag_core::ports::{ApiError, MatchPort};
use ag_core::user::{Capability, RoleSet};

#[derive(Debug, thiserror::Error)]
pub enum MatchActionError {
    #[error("your role does not allow this ({0:?})")]
    Forbidden(Capability),
    #[error(transparent)]
    Api(#[from] ApiError),
}

fn required_capability(command: &MatchCommand) -> Option<Capability> {
    match command {
        MatchCommand::AssignDriver(_) => Some(Capability::AssignDriver),
        MatchCommand::Complete => Some(Capability::CompleteDelivery),
        MatchCommand::Accept | MatchCommand::Cancel => None,
    }
}

pub struct ManageMatches {
    matches: Arc<dyn MatchPort>,
}

impl ManageMatches {
    pub fn new(matches: Arc<dyn MatchPort>) -> Self {
        Self { matches }
    }

    pub async fn propose(
        &self,
        actor: &RoleSet,
        new_match: NewMatch,
    ) -> Result<Match, MatchActionError> {
        if !actor.can(Capability::ProposeMatch) {
            return Err(MatchActionError::Forbidden(Capability::ProposeMatch));
        }
        let span = info_span!(
            "usecase.matches.propose",
            listing = %new_match.listing_id,
            demand = %new_match.demand_id
        );
        async move {
            let created = self.matches.create_match(&new_match).await?;
            info!(id = %created.id, "match proposed");
            Ok(created)
        }
        .instrument(span)
        .await
    }

    pub async fn apply(
        &self,
        actor: &RoleSet,
        id: &MatchId,
        command: MatchCommand,
    ) -> Result<Match, MatchActionError> {
        if let Some(capability) = required_capability(&command) {
            if !actor.can(capability) {
                return Err(MatchActionError::Forbidden(capability));
            }
        }
        let span = info_span!("usecase.matches.apply", id = %id, action = command.path_segment());
        async move {
            let updated = self.matches.apply(id, &command).await?;
            info!(status = ?updated.status, "match updated");
            Ok(updated)
        }
        .instrument(span)
        .await
    }

    pub async fn suggestions(
        &self,
        query: &SuggestionQuery,
    ) -> Result<Vec<MatchSuggestion>, MatchActionError> {
        Ok(self.matches.suggestions(query).await?)
    }
}
