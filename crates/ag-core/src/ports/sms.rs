use async_trait::async_trait;

use super::errors::ApiError;
use crate::marketplace::SmsRequest;

#[async_trait]
pub trait SmsPort: Send + Sync {
    /// `POST /sms/send`.
    async fn send_sms(&self, request: &SmsRequest) -> Result<(), ApiError>;
}
