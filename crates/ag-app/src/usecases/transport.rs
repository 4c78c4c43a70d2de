use std::sync::Arc;

use ag_core::ids::{MatchId, UserId};
use ag_core::marketplace::{TransportOffer, TransportSuggestion};
use ag_core::ports::{ApiError, TransportPort};

/// Driver-side transport views: own offers and route suggestions for a
/// match.
pub struct DriverTransport {
    transport: Arc<dyn TransportPort>,
}

impl DriverTransport {
    pub fn new(transport: Arc<dyn TransportPort>) -> Self {
        Self { transport }
    }

    pub async fn offers_of(&self, driver: &UserId) -> Result<Vec<TransportOffer>, ApiError> {
        self.transport.by_driver(driver).await
    }

    /// Suggestions ordered best first.
    pub async fn suggestions_for(
        &self,
        match_id: &MatchId,
    ) -> Result<Vec<TransportSuggestion>, ApiError> {
        let mut suggestions = self.transport.suggest_for_match(match_id).await?;
        suggestions.sort_by(|a, b| {
            b.score
                .unwrap_or(f64::MIN)
                .total_cmp(&a.score.unwrap_or(f64::MIN))
        });
        Ok(suggestions)
    }
}
