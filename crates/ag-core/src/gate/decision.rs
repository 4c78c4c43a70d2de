//! Role-gate decision table.
//!
//! Evaluated in strict order, first match wins:
//!
//! 1. rejected verification      → onboarding (resubmission), allowed pages stay
//! 2. incomplete profile         → onboarding, from every page
//! 3. not verified + approved    → onboarding (waiting), funnel and public pages stay
//! 4. approved without a tier    → plan selection
//! 5. otherwise                  → authorized; funnel pages bounce to the role landing page
//!
//! A missing record (fetch failed, user not created yet) is treated like an
//! incomplete profile.

use serde::Serialize;

use crate::routes::Route;
use crate::user::UserRecord;

/// Why a signed-in user is held in the onboarding funnel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OnboardingPhase {
    /// Verification was rejected; the user may resubmit.
    Rejected,
    /// Role, name, phone or county missing.
    IncompleteProfile,
    /// Submitted and waiting for an admin.
    AwaitingVerification,
    /// The profile could not be fetched.
    Unknown,
}

/// Gate state. Rendering is driven purely by this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GateState {
    Checking,
    Unauthenticated,
    NeedsOnboarding(OnboardingPhase),
    NeedsPlan,
    Authorized,
}

/// What the route shell should put on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateView {
    /// Spinner while the profile is being fetched.
    Loading,
    /// Render the page for this route.
    Render(Route),
    /// Render nothing; a redirect is in flight.
    Nothing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateDecision {
    pub state: GateState,
    pub redirect: Option<Route>,
}

impl GateDecision {
    fn new(state: GateState, current: &Route, target: Option<Route>) -> Self {
        let redirect = target.filter(|t| t != current);
        Self { state, redirect }
    }

    pub fn view(&self, current: &Route) -> GateView {
        match (&self.state, &self.redirect) {
            (GateState::Checking, _) => GateView::Loading,
            (_, Some(_)) => GateView::Nothing,
            (_, None) => GateView::Render(current.clone()),
        }
    }
}

impl GateState {
    pub fn is_authorized(&self) -> bool {
        matches!(self, GateState::Authorized)
    }

    /// Header and footer are hidden while the user is inside the funnel.
    pub fn shows_chrome(&self, route: &Route) -> bool {
        match self {
            GateState::NeedsOnboarding(_) | GateState::NeedsPlan | GateState::Checking => {
                !route.is_onboarding_funnel()
            }
            GateState::Unauthenticated | GateState::Authorized => true,
        }
    }
}

fn rejected_may_stay(route: &Route) -> bool {
    route.is_public()
        || matches!(
            route,
            Route::Onboarding | Route::VerificationStatus | Route::Profile
        )
}

fn waiting_may_stay(route: &Route) -> bool {
    route.is_public()
        || matches!(
            route,
            Route::Onboarding | Route::PlanSelection | Route::VerificationStatus
        )
}

/// Pure decision for a signed-in user. `record` is `None` when the profile
/// fetch failed.
pub fn derive_decision(record: Option<&UserRecord>, route: &Route) -> GateDecision {
    let Some(user) = record else {
        return GateDecision::new(
            GateState::NeedsOnboarding(OnboardingPhase::Unknown),
            route,
            Some(Route::Onboarding),
        );
    };

    if user.is_rejected() {
        let target = (!rejected_may_stay(route)).then_some(Route::Onboarding);
        return GateDecision::new(
            GateState::NeedsOnboarding(OnboardingPhase::Rejected),
            route,
            target,
        );
    }

    if !user.is_profile_complete() {
        return GateDecision::new(
            GateState::NeedsOnboarding(OnboardingPhase::IncompleteProfile),
            route,
            Some(Route::Onboarding),
        );
    }

    if !user.is_approved() {
        let target = (!waiting_may_stay(route)).then_some(Route::Onboarding);
        return GateDecision::new(
            GateState::NeedsOnboarding(OnboardingPhase::AwaitingVerification),
            route,
            target,
        );
    }

    if user.tier.is_none() {
        return GateDecision::new(GateState::NeedsPlan, route, Some(Route::PlanSelection));
    }

    let target = matches!(route, Route::Onboarding | Route::PlanSelection)
        .then(|| Route::landing_for(user.primary_role));
    GateDecision::new(GateState::Authorized, route, target)
}

/// Decision for a visitor without a session: public pages render, protected
/// pages go home where the identity provider offers sign-in.
pub fn unauthenticated_decision(route: &Route) -> GateDecision {
    let target = route.is_protected().then_some(Route::Home);
    GateDecision::new(GateState::Unauthenticated, route, target)
}
