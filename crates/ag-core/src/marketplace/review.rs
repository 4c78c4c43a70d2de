use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::linked::UserRef;
use crate::ids::{MatchId, ReviewId, UserId};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(alias = "_id")]
    pub id: ReviewId,
    #[serde(default)]
    pub reviewer: Option<UserRef>,
    #[serde(default, alias = "reviewedUser")]
    pub reviewee: Option<UserRef>,
    #[serde(default, rename = "match")]
    pub match_id: Option<MatchId>,
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviewValidationError {
    #[error("rating must be between 1 and 5, got {0}")]
    RatingOutOfRange(u8),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub reviewee_id: UserId,
    pub match_id: MatchId,
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl NewReview {
    pub fn validate(&self) -> Result<(), ReviewValidationError> {
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(ReviewValidationError::RatingOutOfRange(self.rating));
        }
        Ok(())
    }
}

/// Mean rating, `None` when there are no reviews.
pub fn average_rating(reviews: &[Review]) -> Option<f64> {
    if reviews.is_empty() {
        return None;
    }
    let total: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
    Some(f64::from(total) / reviews.len() as f64)
}
