//! Role-gate state machine.
//!
//! Pure `(state, event) -> (state, actions)` transitions. The orchestrator in
//! the application layer feeds it navigation and fetch results and executes
//! the returned actions; nothing here performs I/O.

use crate::routes::Route;
use crate::user::UserRecord;

use super::decision::{derive_decision, unauthenticated_decision, GateDecision, GateState};

/// Inputs to the gate.
#[derive(Debug, Clone, PartialEq)]
pub enum GateEvent {
    /// The user navigated to a new route.
    PathChanged { route: Route },
    /// The window regained focus; re-check without leaving the current state.
    FocusRegained { route: Route },
    /// `GET /users/me` succeeded.
    ProfileLoaded {
        route: Route,
        record: Box<UserRecord>,
    },
    /// `GET /users/me` failed (network error, 404 for a new user, ...).
    ProfileFailed { route: Route },
    /// No session is available.
    SignedOut { route: Route },
}

/// Side-effects requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateAction {
    FetchProfile { route: Route },
    Redirect { to: Route },
}

pub struct RoleGateMachine;

impl RoleGateMachine {
    pub fn transition(state: GateState, event: GateEvent) -> (GateState, Vec<GateAction>) {
        match event {
            GateEvent::PathChanged { route } => {
                (GateState::Checking, vec![GateAction::FetchProfile { route }])
            }
            GateEvent::FocusRegained { route } => {
                (state, vec![GateAction::FetchProfile { route }])
            }
            GateEvent::ProfileLoaded { route, record } => {
                Self::apply(derive_decision(Some(&record), &route))
            }
            GateEvent::ProfileFailed { route } => Self::apply(derive_decision(None, &route)),
            GateEvent::SignedOut { route } => Self::apply(unauthenticated_decision(&route)),
        }
    }

    fn apply(decision: GateDecision) -> (GateState, Vec<GateAction>) {
        let actions = decision
            .redirect
            .map(|to| vec![GateAction::Redirect { to }])
            .unwrap_or_default();
        (decision.state, actions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::OnboardingPhase;
    use crate::user::{Location, Role, RoleSet, VerificationStatus};

    fn approved_without_tier() -> UserRecord {
        UserRecord {
            primary_role: Some(Role::Buyer),
            roles: RoleSet::single(Role::Buyer),
            name: Some("B".into()),
            phone: Some("0711".into()),
            location: Some(Location::county("Kisumu")),
            is_verified: true,
            verification_status: VerificationStatus::Approved,
            ..Default::default()
        }
    }

    #[test]
    fn path_change_enters_checking_and_fetches() {
        let (state, actions) = RoleGateMachine::transition(
            GateState::Authorized,
            GateEvent::PathChanged {
                route: Route::Demand,
            },
        );
        assert_eq!(state, GateState::Checking);
        assert_eq!(
            actions,
            vec![GateAction::FetchProfile {
                route: Route::Demand
            }]
        );
    }

    #[test]
    fn focus_recheck_keeps_current_state() {
        let (state, actions) = RoleGateMachine::transition(
            GateState::NeedsPlan,
            GateEvent::FocusRegained {
                route: Route::PlanSelection,
            },
        );
        assert_eq!(state, GateState::NeedsPlan);
        assert_eq!(actions.len(), 1);
    }

    #[test]
    fn loaded_profile_is_deterministic() {
        let event = GateEvent::ProfileLoaded {
            route: Route::Demand,
            record: Box::new(approved_without_tier()),
        };
        let first = RoleGateMachine::transition(GateState::Checking, event.clone());
        let second = RoleGateMachine::transition(GateState::Checking, event);
        assert_eq!(first, second);
        assert_eq!(first.0, GateState::NeedsPlan);
        assert_eq!(
            first.1,
            vec![GateAction::Redirect {
                to: Route::PlanSelection
            }]
        );
    }

    #[test]
    fn failed_fetch_routes_to_onboarding() {
        let (state, actions) = RoleGateMachine::transition(
            GateState::Checking,
            GateEvent::ProfileFailed {
                route: Route::Onboarding,
            },
        );
        assert_eq!(state, GateState::NeedsOnboarding(OnboardingPhase::Unknown));
        assert!(actions.is_empty());
    }

    #[test]
    fn signed_out_on_protected_route_goes_home() {
        let (state, actions) = RoleGateMachine::transition(
            GateState::Checking,
            GateEvent::SignedOut { route: Route::Sms },
        );
        assert_eq!(state, GateState::Unauthenticated);
        assert_eq!(actions, vec![GateAction::Redirect { to: Route::Home }]);
    }
}
