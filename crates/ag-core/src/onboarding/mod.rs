//! Onboarding wizard domain.

pub mod draft;
pub mod state_machine;

pub use draft::{OnboardingDraft, WizardError};
pub use state_machine::{OnboardingWizard, WizardAction, WizardEvent, WizardState, WizardStep};
