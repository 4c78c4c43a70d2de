use async_trait::async_trait;

use super::errors::ApiError;
use crate::ids::UserId;
use crate::marketplace::UserSummary;
use crate::user::{ProfileUpdate, UserRecord, VerificationDecision};

/// Access to the signed-in user's own record and to public profiles.
#[async_trait]
pub trait UserProfilePort: Send + Sync {
    /// `GET /users/me`. A 404 means the user has not been created yet.
    async fn current_user(&self) -> Result<UserRecord, ApiError>;

    /// `PUT /users/me` with only the set fields.
    async fn update_current_user(&self, update: &ProfileUpdate) -> Result<UserRecord, ApiError>;

    /// `GET /users/:id`.
    async fn user(&self, id: &UserId) -> Result<UserSummary, ApiError>;
}

/// Admin-only verification review.
#[async_trait]
pub trait VerificationAdminPort: Send + Sync {
    /// `GET /users/pending-verification`.
    async fn pending_verification(&self) -> Result<Vec<UserRecord>, ApiError>;

    /// `POST /users/:id/verify`.
    async fn verify_user(
        &self,
        id: &UserId,
        decision: &VerificationDecision,
    ) -> Result<UserRecord, ApiError>;
}
