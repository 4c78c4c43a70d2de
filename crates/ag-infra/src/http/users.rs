use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use ag_core::ids::UserId;
use ag_core::marketplace::UserSummary;
use ag_core::ports::{ApiError, UserProfilePort, VerificationAdminPort};
use ag_core::user::{ProfileUpdate, UserRecord, VerificationDecision};

use super::ApiClient;

const ME: &str = "users/me";

#[async_trait]
impl UserProfilePort for ApiClient {
    async fn current_user(&self) -> Result<UserRecord, ApiError> {
        self.get_json(ME).await
    }

    async fn update_current_user(&self, update: &ProfileUpdate) -> Result<UserRecord, ApiError> {
        debug!(
            tier = ?update.tier,
            verification_status = ?update.verification_status,
            "updating current user"
        );
        self.put_json(ME, update).await
    }

    async fn user(&self, id: &UserId) -> Result<UserSummary, ApiError> {
        self.get_json(&format!("users/{id}")).await
    }
}

#[async_trait]
impl VerificationAdminPort for ApiClient {
    async fn pending_verification(&self) -> Result<Vec<UserRecord>, ApiError> {
        self.get_json("users/pending-verification").await
    }

    async fn verify_user(
        &self,
        id: &UserId,
        decision: &VerificationDecision,
    ) -> Result<UserRecord, ApiError> {
        let record: Value = self.post_json(&format!("users/{id}/verify"), decision).await?;
        // Some deployments answer `{ user, message }`.
        let record = match record {
            Value::Object(mut map) if map.contains_key("user") => {
                map.remove("user").unwrap_or(Value::Null)
            }
            other => other,
        };
        serde_json::from_value(record).map_err(|err| ApiError::Decode(err.to_string()))
    }
}
