use serde::Serialize;

/// Body of `POST /sms/send`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SmsRequest {
    pub to: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SmsValidationError {
    #[error("recipient is required")]
    RecipientRequired,
    #[error("message is required")]
    MessageRequired,
}

impl SmsRequest {
    pub fn new(to: &str, message: &str) -> Result<Self, SmsValidationError> {
        let to = to.trim();
        let message = message.trim();
        if to.is_empty() {
            return Err(SmsValidationError::RecipientRequired);
        }
        if message.is_empty() {
            return Err(SmsValidationError::MessageRequired);
        }
        Ok(Self {
            to: to.to_string(),
            message: message.to_string(),
        })
    }
}
