//! End-to-end onboarding: gate, wizard, verification poll and plan selection
//! against an in-memory user backend.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use ag_app::usecases::{
    AwaitVerification, OnboardingOrchestrator, RoleGate, RouteShell, SelectPlan,
};
use ag_core::gate::{GateState, GateView, OnboardingPhase};
use ag_core::ids::UserId;
use ag_core::marketplace::UserSummary;
use ag_core::notify::Toast;
use ag_core::onboarding::{WizardEvent, WizardStep};
use ag_core::ports::{
    ApiError, ImageEncodeError, ImageEncoderPort, NotifierPort, SessionPort, UserProfilePort,
};
use ag_core::routes::Route;
use ag_core::user::{ProfileUpdate, Role, Tier, UserRecord, VerificationStatus};

/// Applies partial updates the way the backend does.
#[derive(Default)]
struct Backend {
    record: Mutex<Option<UserRecord>>,
    writes: Mutex<Vec<ProfileUpdate>>,
}

impl Backend {
    fn decide(&self, status: VerificationStatus) {
        let mut guard = self.record.lock().unwrap();
        let record = guard.as_mut().expect("user exists");
        record.verification_status = status;
        record.is_verified = status == VerificationStatus::Approved;
        if status == VerificationStatus::Rejected {
            record.verification_rejected_reason = Some("ID photo unreadable".into());
        }
    }
}

#[async_trait]
impl UserProfilePort for Backend {
    async fn current_user(&self) -> Result<UserRecord, ApiError> {
        self.record.lock().unwrap().clone().ok_or(ApiError::Http {
            status: 404,
            message: Some("User not found".into()),
        })
    }

    async fn update_current_user(&self, update: &ProfileUpdate) -> Result<UserRecord, ApiError> {
        self.writes.lock().unwrap().push(update.clone());
        let mut guard = self.record.lock().unwrap();
        let record = guard.get_or_insert_with(UserRecord::default);
        if let Some(role) = update.primary_role {
            record.primary_role = Some(role);
        }
        if let Some(roles) = &update.roles {
            record.roles = roles.clone();
        }
        if let Some(name) = &update.name {
            record.name = Some(name.clone());
        }
        if let Some(phone) = &update.phone {
            record.phone = Some(phone.clone());
        }
        if let Some(location) = &update.location {
            record.location = Some(location.clone());
        }
        if let Some(status) = update.verification_status {
            record.verification_status = status;
        }
        if let Some(retries) = update.verification_retry_count {
            record.verification_retry_count = retries;
        }
        if let Some(tier) = update.tier {
            record.tier = Some(tier);
        }
        Ok(record.clone())
    }

    async fn user(&self, _: &UserId) -> Result<UserSummary, ApiError> {
        Err(ApiError::Http {
            status: 404,
            message: None,
        })
    }
}

struct SignedIn;

#[async_trait]
impl SessionPort for SignedIn {
    fn is_signed_in(&self) -> bool {
        true
    }

    async fn bearer_token(&self) -> anyhow::Result<Option<String>> {
        Ok(Some("session".into()))
    }
}

struct NoImages;

#[async_trait]
impl ImageEncoderPort for NoImages {
    async fn encode_data_url(&self, path: &std::path::Path) -> Result<String, ImageEncodeError> {
        Err(ImageEncodeError::UnsupportedFormat(path.display().to_string()))
    }
}

#[derive(Default)]
struct Toasts(Mutex<Vec<Toast>>);

impl NotifierPort for Toasts {
    fn notify(&self, toast: Toast) {
        self.0.lock().unwrap().push(toast);
    }
}

struct App {
    backend: Arc<Backend>,
    gate: Arc<RoleGate>,
    shell: RouteShell,
    wizard: OnboardingOrchestrator,
    plan: SelectPlan,
}

fn app() -> App {
    let backend = Arc::new(Backend::default());
    let gate = Arc::new(RoleGate::new(backend.clone(), Arc::new(SignedIn)));
    let poll = AwaitVerification::new(backend.clone()).with_interval(Duration::from_secs(5));
    App {
        shell: RouteShell::new(gate.clone()),
        wizard: OnboardingOrchestrator::new(
            backend.clone(),
            Arc::new(NoImages),
            Arc::new(Toasts::default()),
            poll,
        ),
        plan: SelectPlan::new(backend.clone(), gate.clone()),
        gate,
        backend,
    }
}

async fn complete_wizard(wizard: &OnboardingOrchestrator) {
    for event in [
        WizardEvent::SelectRole { role: Role::Farmer },
        WizardEvent::Continue,
        WizardEvent::SetName {
            name: "Wafula".into(),
        },
        WizardEvent::SetPhone {
            phone: "0722333444".into(),
        },
        WizardEvent::SelectCounty {
            county: Some("Bungoma".into()),
        },
        WizardEvent::Continue,
        WizardEvent::SetNationalId {
            national_id: Some("12345678".into()),
        },
        WizardEvent::Continue,
    ] {
        wizard.dispatch(event).await;
    }
}

#[tokio::test(start_paused = true)]
async fn new_farmer_reaches_produce_after_approval_and_plan() {
    let app = app();

    // A user the backend does not know yet is sent to the wizard.
    let frames = app.shell.navigate("/produce").await;
    assert_eq!(frames[0].redirect, Some(Route::Onboarding));
    assert_eq!(
        app.gate.state(),
        GateState::NeedsOnboarding(OnboardingPhase::Unknown)
    );

    app.wizard.resume().await;
    complete_wizard(&app.wizard).await;
    assert_eq!(app.backend.writes.lock().unwrap().len(), 1);
    assert_eq!(
        app.wizard.current().step,
        WizardStep::Waiting {
            just_submitted: true
        }
    );

    // Waiting users may stay on the funnel pages.
    let frames = app.shell.navigate("/onboarding").await;
    assert_eq!(frames.len(), 1);
    assert_eq!(
        app.gate.state(),
        GateState::NeedsOnboarding(OnboardingPhase::AwaitingVerification)
    );

    app.backend.decide(VerificationStatus::Approved);
    app.wizard.next_decision().await.expect("poll running");
    assert!(!app.wizard.is_polling());

    // Approved without a tier: exactly one redirect to plan selection.
    let frames = app.shell.navigate("/onboarding").await;
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].redirect, Some(Route::PlanSelection));
    assert_eq!(frames[1].view, GateView::Render(Route::PlanSelection));
    assert_eq!(app.gate.state(), GateState::NeedsPlan);

    let check = app.plan.execute(Tier::Basic).await.unwrap();
    let outcome = check.outcome().unwrap();
    assert_eq!(outcome.state, GateState::Authorized);
    assert_eq!(outcome.redirect, Some(Route::Produce));

    let frames = app.shell.navigate("/produce").await;
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].view, GateView::Render(Route::Produce));
    assert!(frames[0].chrome);
}

#[tokio::test(start_paused = true)]
async fn rejected_farmer_resubmits_from_step_one() {
    let app = app();
    app.wizard.resume().await;
    complete_wizard(&app.wizard).await;

    app.backend.decide(VerificationStatus::Rejected);
    let state = app.wizard.next_decision().await.expect("poll running");
    assert_eq!(state.step, WizardStep::Role);
    assert_eq!(state.resubmission_of, Some(0));

    // Protected pages bounce to the wizard, allowed pages stay.
    let frames = app.shell.navigate("/matches").await;
    assert_eq!(frames[0].redirect, Some(Route::Onboarding));
    let frames = app.shell.navigate("/profile").await;
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].view, GateView::Render(Route::Profile));

    complete_wizard(&app.wizard).await;
    let writes = app.backend.writes.lock().unwrap().clone();
    assert_eq!(writes.len(), 2);
    assert_eq!(writes[1].verification_retry_count, Some(1));
    assert_eq!(
        writes[1].verification_status,
        Some(VerificationStatus::Pending)
    );
    app.wizard.shutdown();
}
