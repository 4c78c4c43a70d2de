use std::sync::Arc;

use tracing::{info, info_span, Instrument};

use ag_core::ids::{MatchId, UserId};
use ag_core::marketplace::{average_rating, NewReview, Review, ReviewValidationError, UserSummary};
use ag_core::ports::{ApiError, ReviewPort, UserProfilePort};

#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error(transparent)]
    Invalid(#[from] ReviewValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

pub struct SubmitReview {
    reviews: Arc<dyn ReviewPort>,
}

impl SubmitReview {
    pub fn new(reviews: Arc<dyn ReviewPort>) -> Self {
        Self { reviews }
    }

    pub async fn execute(&self, review: NewReview) -> Result<Review, ReviewError> {
        review.validate()?;
        let span = info_span!("usecase.submit_review.execute", match_id = %review.match_id);
        async move {
            let created = self.reviews.create_review(&review).await?;
            info!(rating = created.rating, "review submitted");
            Ok(created)
        }
        .instrument(span)
        .await
    }
}

/// Public reviews page of a user.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ReviewPage {
    pub user: UserSummary,
    pub reviews: Vec<Review>,
    pub average: Option<f64>,
}

pub struct ListReviews {
    reviews: Arc<dyn ReviewPort>,
    users: Arc<dyn UserProfilePort>,
}

impl ListReviews {
    pub fn new(reviews: Arc<dyn ReviewPort>, users: Arc<dyn UserProfilePort>) -> Self {
        Self { reviews, users }
    }

    pub async fn for_user(&self, id: &UserId) -> Result<ReviewPage, ApiError> {
        let user = self.users.user(id).await?;
        let reviews = self.reviews.reviews_for_user(id).await?;
        let average = average_rating(&reviews);
        Ok(ReviewPage {
            user,
            reviews,
            average,
        })
    }

    pub async fn for_match(&self, id: &MatchId) -> Result<Vec<Review>, ApiError> {
        self.reviews.reviews_for_match(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mockall::mock;

    mock! {
        Reviews {}

        #[async_trait]
        impl ReviewPort for Reviews {
            async fn create_review(&self, review: &NewReview) -> Result<Review, ApiError>;
            async fn reviews_for_user(&self, user: &UserId) -> Result<Vec<Review>, ApiError>;
            async fn reviews_for_match(&self, match_id: &MatchId) -> Result<Vec<Review>, ApiError>;
        }
    }

    #[tokio::test]
    async fn out_of_range_rating_is_not_posted() {
        let mut port = MockReviews::new();
        port.expect_create_review().times(0);
        let uc = SubmitReview::new(Arc::new(port));

        let err = uc
            .execute(NewReview {
                reviewee_id: UserId::from("u2"),
                match_id: MatchId::from("m1"),
                rating: 6,
                comment: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ReviewError::Invalid(ReviewValidationError::RatingOutOfRange(6))
        ));
    }
}
