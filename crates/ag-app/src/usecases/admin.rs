//! Admin review of pending identity verifications.

use std::sync::Arc;

use tracing::{info, info_span, Instrument};

use ag_core::ids::UserId;
use ag_core::ports::{ApiError, VerificationAdminPort};
use ag_core::user::{Capability, RoleSet, UserRecord, VerificationDecision};

#[derive(Debug, thiserror::Error)]
pub enum VerificationReviewError {
    #[error("only administrators can review verifications")]
    Forbidden,
    #[error("a rejection needs a reason")]
    ReasonRequired,
    #[error(transparent)]
    Api(#[from] ApiError),
}

pub struct ReviewVerifications {
    admin: Arc<dyn VerificationAdminPort>,
}

impl ReviewVerifications {
    pub fn new(admin: Arc<dyn VerificationAdminPort>) -> Self {
        Self { admin }
    }

    fn authorize(actor: &RoleSet) -> Result<(), VerificationReviewError> {
        if actor.can(Capability::ReviewVerifications) {
            Ok(())
        } else {
            Err(VerificationReviewError::Forbidden)
        }
    }

    pub async fn pending(&self, actor: &RoleSet) -> Result<Vec<UserRecord>, VerificationReviewError> {
        Self::authorize(actor)?;
        Ok(self.admin.pending_verification().await?)
    }

    pub async fn decide(
        &self,
        actor: &RoleSet,
        user: &UserId,
        decision: VerificationDecision,
    ) -> Result<UserRecord, VerificationReviewError> {
        Self::authorize(actor)?;
        if decision
            .verification_rejected_reason
            .as_deref()
            .is_some_and(|reason| reason.trim().is_empty())
        {
            return Err(VerificationReviewError::ReasonRequired);
        }

        let span = info_span!(
            "usecase.review_verifications.decide",
            user = %user,
            status = ?decision.verification_status
        );
        async move {
            let updated = self.admin.verify_user(user, &decision).await?;
            info!("verification decided");
            Ok(updated)
        }
        .instrument(span)
        .await
    }
}
