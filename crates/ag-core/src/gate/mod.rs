//! Role gate: decides, for the current user and route, whether to render the
//! requested page or send the user through onboarding / plan selection.

pub mod decision;
pub mod state_machine;

pub use decision::{
    derive_decision, unauthenticated_decision, GateDecision, GateState, GateView, OnboardingPhase,
};
pub use state_machine::{GateAction, GateEvent, RoleGateMachine};
