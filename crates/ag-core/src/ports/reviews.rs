use async_trait::async_trait;

use super::errors::ApiError;
use crate::ids::{MatchId, UserId};
use crate::marketplace::{NewReview, Review};

#[async_trait]
pub trait ReviewPort: Send + Sync {
    async fn create_review(&self, review: &NewReview) -> Result<Review, ApiError>;
    async fn reviews_for_user(&self, user: &UserId) -> Result<Vec<Review>, ApiError>;
    async fn reviews_for_match(&self, match_id: &MatchId) -> Result<Vec<Review>, ApiError>;
}
