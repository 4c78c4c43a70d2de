use async_trait::async_trait;

use super::errors::ApiError;
use crate::filters::Filters;
use crate::marketplace::Resource;

/// Read side of a REST collection.
#[async_trait]
pub trait ResourceReadPort<R: Resource>: Send + Sync {
    /// `GET /<path><query>`; empty filter values are omitted.
    async fn list(&self, filters: &Filters) -> Result<Vec<R>, ApiError>;

    /// `GET /<path>/:id`.
    async fn get(&self, id: &R::Id) -> Result<R, ApiError>;
}

/// Write side of a REST collection.
#[async_trait]
pub trait ResourceWritePort<R: Resource>: Send + Sync {
    async fn create(&self, draft: &R::Draft) -> Result<R, ApiError>;
    async fn update(&self, id: &R::Id, draft: &R::Draft) -> Result<R, ApiError>;
    async fn delete(&self, id: &R::Id) -> Result<(), ApiError>;
}
