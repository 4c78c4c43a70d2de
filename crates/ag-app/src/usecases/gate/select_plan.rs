use std::sync::Arc;

use tracing::{info, info_span, Instrument};

use ag_core::ports::{ApiError, UserProfilePort};
use ag_core::routes::Route;
use ag_core::user::{ProfileUpdate, Tier};

use super::{GateCheck, RoleGate};

#[derive(Debug, thiserror::Error)]
pub enum SelectPlanError {
    #[error("failed to save plan: {0}")]
    Save(#[from] ApiError),
}

/// Writes the chosen tier, then lets the gate re-derive from a fresh record.
pub struct SelectPlan {
    profile: Arc<dyn UserProfilePort>,
    gate: Arc<RoleGate>,
}

impl SelectPlan {
    pub fn new(profile: Arc<dyn UserProfilePort>, gate: Arc<RoleGate>) -> Self {
        Self { profile, gate }
    }

    pub async fn execute(&self, tier: Tier) -> Result<GateCheck, SelectPlanError> {
        let span = info_span!("usecase.select_plan.execute", tier = %tier);
        async move {
            self.profile
                .update_current_user(&ProfileUpdate::tier(tier))
                .await?;
            info!("plan saved");
            Ok(self.gate.on_focus_regained(Route::PlanSelection).await)
        }
        .instrument(span)
        .await
    }
}
