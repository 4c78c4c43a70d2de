//! Chat, reviews and SMS.

use async_trait::async_trait;
use reqwest::Method;

use ag_core::ids::{MatchId, UserId};
use ag_core::marketplace::{Message, NewMessage, NewReview, Review, SmsRequest};
use ag_core::ports::{ApiError, MessagePort, ReviewPort, SmsPort};

use super::ApiClient;

#[async_trait]
impl MessagePort for ApiClient {
    async fn send(&self, message: &NewMessage) -> Result<Message, ApiError> {
        self.post_json("messages", message).await
    }

    async fn thread(&self, match_id: &MatchId) -> Result<Vec<Message>, ApiError> {
        self.get_json(&format!("messages/match/{match_id}")).await
    }

    async fn mark_read(&self, match_id: &MatchId) -> Result<(), ApiError> {
        self.execute(Method::PUT, &format!("messages/read/{match_id}"), None)
            .await
    }
}

#[async_trait]
impl ReviewPort for ApiClient {
    async fn create_review(&self, review: &NewReview) -> Result<Review, ApiError> {
        self.post_json("reviews", review).await
    }

    async fn reviews_for_user(&self, user: &UserId) -> Result<Vec<Review>, ApiError> {
        self.get_json(&format!("reviews/user/{user}")).await
    }

    async fn reviews_for_match(&self, match_id: &MatchId) -> Result<Vec<Review>, ApiError> {
        self.get_json(&format!("reviews/match/{match_id}")).await
    }
}

#[async_trait]
impl SmsPort for ApiClient {
    async fn send_sms(&self, request: &SmsRequest) -> Result<(), ApiError> {
        let body = serde_json::to_value(request).map_err(|err| ApiError::Decode(err.to_string()))?;
        self.execute(Method::POST, "sms/send", Some(&body)).await
    }
}
