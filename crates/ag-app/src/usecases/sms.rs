use std::sync::Arc;

use tracing::{info, info_span, Instrument};

use ag_core::marketplace::{SmsRequest, SmsValidationError};
use ag_core::ports::{ApiError, SmsPort};

#[derive(Debug, thiserror::Error)]
pub enum SendSmsError {
    #[error(transparent)]
    Invalid(#[from] SmsValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

pub struct SendSms {
    sms: Arc<dyn SmsPort>,
}

impl SendSms {
    pub fn new(sms: Arc<dyn SmsPort>) -> Self {
        Self { sms }
    }

    pub async fn execute(&self, to: &str, message: &str) -> Result<(), SendSmsError> {
        let request = SmsRequest::new(to, message)?;
        let span = info_span!("usecase.send_sms.execute", chars = request.message.len());
        async move {
            self.sms.send_sms(&request).await?;
            info!("sms sent");
            Ok(())
        }
        .instrument(span)
        .await
    }
}
