//! Generic listing CRUD plus the transport-specific endpoints.

use async_trait::async_trait;
use reqwest::Method;

use ag_core::filters::Filters;
use ag_core::ids::{MatchId, TransportId, UserId};
use ag_core::marketplace::{Resource, TransportOffer, TransportSuggestion};
use ag_core::ports::{ApiError, ResourceReadPort, ResourceWritePort, TransportPort};

use super::ApiClient;

#[async_trait]
impl<R: Resource> ResourceReadPort<R> for ApiClient {
    async fn list(&self, filters: &Filters) -> Result<Vec<R>, ApiError> {
        self.get_json(&format!("{}{}", R::PATH, filters.to_query_string()))
            .await
    }

    async fn get(&self, id: &R::Id) -> Result<R, ApiError> {
        self.get_json(&format!("{}/{id}", R::PATH)).await
    }
}

#[async_trait]
impl<R: Resource> ResourceWritePort<R> for ApiClient {
    async fn create(&self, draft: &R::Draft) -> Result<R, ApiError> {
        self.post_json(R::PATH, draft).await
    }

    async fn update(&self, id: &R::Id, draft: &R::Draft) -> Result<R, ApiError> {
        self.put_json(&format!("{}/{id}", R::PATH), draft).await
    }

    async fn delete(&self, id: &R::Id) -> Result<(), ApiError> {
        self.execute(Method::DELETE, &format!("{}/{id}", R::PATH), None)
            .await
    }
}

#[async_trait]
impl TransportPort for ApiClient {
    async fn by_driver(&self, driver: &UserId) -> Result<Vec<TransportOffer>, ApiError> {
        self.get_json(&format!("transport/driver/{driver}")).await
    }

    async fn suggest_for_match(
        &self,
        match_id: &MatchId,
    ) -> Result<Vec<TransportSuggestion>, ApiError> {
        self.get_json(&format!("transport/suggest/{match_id}")).await
    }

    async fn increment_views(&self, id: &TransportId) -> Result<(), ApiError> {
        self.execute(Method::POST, &format!("transport/{id}/views"), None)
            .await
    }
}
