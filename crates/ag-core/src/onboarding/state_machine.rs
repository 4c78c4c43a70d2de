//! Onboarding wizard state machine.
//!
//! Strictly linear: role → profile → legal details → waiting. `Continue` on a
//! step validates only that step. The one backend write happens when the
//! legal-details step is submitted; the waiting step polls until an admin
//! decides. The old stand-alone "success" screen is the `just_submitted`
//! flag of the waiting step.

use serde::Serialize;
use tracing::warn;

use crate::user::{ProfileUpdate, Role, UserRecord};

use super::draft::{OnboardingDraft, WizardError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WizardStep {
    Role,
    Profile,
    LegalDetails,
    Waiting { just_submitted: bool },
}

impl WizardStep {
    /// 1-based position shown in the progress indicator.
    pub fn number(&self) -> u8 {
        match self {
            WizardStep::Role => 1,
            WizardStep::Profile => 2,
            WizardStep::LegalDetails => 3,
            WizardStep::Waiting { .. } => 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WizardState {
    pub step: WizardStep,
    pub draft: OnboardingDraft,
    pub error: Option<WizardError>,
    /// The combined write is in flight.
    pub submitting: bool,
    /// Retry counter of a rejected submission being redone.
    pub resubmission_of: Option<u32>,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            step: WizardStep::Role,
            draft: OnboardingDraft::default(),
            error: None,
            submitting: false,
            resubmission_of: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardEvent {
    SelectRole { role: Role },
    SetName { name: String },
    SetPhone { phone: String },
    SelectCounty { county: Option<String> },
    SelectSubcounty { subcounty: Option<String> },
    SelectTown { town: Option<String> },
    SetNationalId { national_id: Option<String> },
    AttachIdImage { data_url: String },
    RemoveIdImage,
    Continue,
    Back,
    SubmitSucceeded,
    SubmitFailed { message: String },
    VerificationApproved,
    VerificationRejected { retry_count: u32 },
    AcknowledgeSuccess,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WizardAction {
    /// Perform the single `PUT /users/me` carrying every collected field.
    SubmitProfile { update: ProfileUpdate },
    StartVerificationPoll,
    StopVerificationPoll,
}

pub struct OnboardingWizard;

impl OnboardingWizard {
    /// Initial wizard state for a (possibly missing) user record.
    pub fn resume(record: Option<&UserRecord>) -> (WizardState, Vec<WizardAction>) {
        let Some(record) = record else {
            return (WizardState::default(), Vec::new());
        };

        if record.is_rejected() {
            return (
                WizardState {
                    resubmission_of: Some(record.verification_retry_count),
                    ..WizardState::default()
                },
                Vec::new(),
            );
        }

        let draft = OnboardingDraft::from_record(record);
        if record.is_profile_complete() && !record.is_approved() {
            return (
                WizardState {
                    step: WizardStep::Waiting {
                        just_submitted: false,
                    },
                    draft,
                    ..WizardState::default()
                },
                vec![WizardAction::StartVerificationPoll],
            );
        }

        (
            WizardState {
                draft,
                ..WizardState::default()
            },
            Vec::new(),
        )
    }

    pub fn transition(mut state: WizardState, event: WizardEvent) -> (WizardState, Vec<WizardAction>) {
        use WizardEvent::*;

        if state.submitting && !matches!(event, SubmitSucceeded | SubmitFailed { .. }) {
            return (state, Vec::new());
        }

        match (state.step, event) {
            (WizardStep::Role, SelectRole { role }) => {
                state.draft.role = Some(role);
                state.error = None;
                (state, Vec::new())
            }
            (WizardStep::Role, Continue) => match state.draft.validate_role() {
                Ok(_) => Self::goto(state, WizardStep::Profile),
                Err(err) => Self::fail(state, err),
            },

            (WizardStep::Profile, SetName { name }) => {
                state.draft.name = name;
                (state, Vec::new())
            }
            (WizardStep::Profile, SetPhone { phone }) => {
                state.draft.phone = phone;
                (state, Vec::new())
            }
            (WizardStep::Profile, SelectCounty { county }) => {
                state.draft.location.set_county(county);
                (state, Vec::new())
            }
            (WizardStep::Profile, SelectSubcounty { subcounty }) => {
                state.draft.location.set_subcounty(subcounty);
                (state, Vec::new())
            }
            (WizardStep::Profile, SelectTown { town }) => {
                state.draft.location.set_town(town);
                (state, Vec::new())
            }
            (WizardStep::Profile, Continue) => match state.draft.validate_profile() {
                Ok(()) => Self::goto(state, WizardStep::LegalDetails),
                Err(err) => Self::fail(state, err),
            },
            (WizardStep::Profile, Back) => Self::goto(state, WizardStep::Role),

            (WizardStep::LegalDetails, SetNationalId { national_id }) => {
                state.draft.national_id = national_id;
                (state, Vec::new())
            }
            (WizardStep::LegalDetails, AttachIdImage { data_url }) => {
                state.draft.id_image = Some(data_url);
                (state, Vec::new())
            }
            (WizardStep::LegalDetails, RemoveIdImage) => {
                state.draft.id_image = None;
                (state, Vec::new())
            }
            (WizardStep::LegalDetails, Back) => Self::goto(state, WizardStep::Profile),
            (WizardStep::LegalDetails, Continue) => {
                let update = match state.draft.to_update(state.resubmission_of) {
                    Ok(update) => update,
                    Err(err) => return Self::fail(state, err),
                };
                state.submitting = true;
                state.error = None;
                (state, vec![WizardAction::SubmitProfile { update }])
            }
            (WizardStep::LegalDetails, SubmitSucceeded) => {
                state.submitting = false;
                state.resubmission_of = None;
                state.step = WizardStep::Waiting {
                    just_submitted: true,
                };
                (state, vec![WizardAction::StartVerificationPoll])
            }
            (WizardStep::LegalDetails, SubmitFailed { message }) => {
                state.submitting = false;
                Self::fail(state, WizardError::SubmitFailed(message))
            }

            (WizardStep::Waiting { .. }, AcknowledgeSuccess | Continue) => Self::goto(
                state,
                WizardStep::Waiting {
                    just_submitted: false,
                },
            ),
            (WizardStep::Waiting { .. }, VerificationApproved) => {
                (state, vec![WizardAction::StopVerificationPoll])
            }
            (WizardStep::Waiting { .. }, VerificationRejected { retry_count }) => (
                WizardState {
                    resubmission_of: Some(retry_count),
                    ..WizardState::default()
                },
                vec![WizardAction::StopVerificationPoll],
            ),

            (step, event) => {
                warn!(?step, ?event, "ignored onboarding wizard event");
                (state, Vec::new())
            }
        }
    }

    fn goto(mut state: WizardState, step: WizardStep) -> (WizardState, Vec<WizardAction>) {
        state.step = step;
        state.error = None;
        (state, Vec::new())
    }

    fn fail(mut state: WizardState, error: WizardError) -> (WizardState, Vec<WizardAction>) {
        state.error = Some(error);
        (state, Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::{Location, RoleSet, VerificationStatus};

    fn run(state: WizardState, events: Vec<WizardEvent>) -> (WizardState, Vec<WizardAction>) {
        events
            .into_iter()
            .fold((state, Vec::new()), |(state, mut all), event| {
                let (next, actions) = OnboardingWizard::transition(state, event);
                all.extend(actions);
                (next, all)
            })
    }

    fn through_profile() -> Vec<WizardEvent> {
        vec![
            WizardEvent::SelectRole { role: Role::Farmer },
            WizardEvent::Continue,
            WizardEvent::SetName { name: "Otieno".into() },
            WizardEvent::SetPhone {
                phone: "0733111222".into(),
            },
            WizardEvent::SelectCounty {
                county: Some("Kisumu".into()),
            },
            WizardEvent::Continue,
        ]
    }

    #[test]
    fn continue_without_role_sets_error() {
        let (state, actions) =
            OnboardingWizard::transition(WizardState::default(), WizardEvent::Continue);
        assert_eq!(state.step, WizardStep::Role);
        assert_eq!(state.error, Some(WizardError::RoleRequired));
        assert!(actions.is_empty());
    }

    #[test]
    fn steps_before_legal_details_never_write() {
        let (state, actions) = run(WizardState::default(), through_profile());
        assert_eq!(state.step, WizardStep::LegalDetails);
        assert!(actions.is_empty());
    }

    #[test]
    fn legal_submit_emits_one_combined_write() {
        let mut events = through_profile();
        events.push(WizardEvent::SetNationalId {
            national_id: Some("12345678".into()),
        });
        events.push(WizardEvent::Continue);
        let (state, actions) = run(WizardState::default(), events);

        assert!(state.submitting);
        assert_eq!(actions.len(), 1);
        let WizardAction::SubmitProfile { update } = &actions[0] else {
            panic!("expected submit action");
        };
        assert_eq!(update.primary_role, Some(Role::Farmer));
        assert_eq!(update.name.as_deref(), Some("Otieno"));
        assert_eq!(update.national_id.as_deref(), Some("12345678"));
        assert_eq!(update.location, Some(Location::county("Kisumu")));
    }

    #[test]
    fn input_is_ignored_while_submitting() {
        let mut events = through_profile();
        events.push(WizardEvent::Continue);
        events.push(WizardEvent::Continue);
        let (_, actions) = run(WizardState::default(), events);
        assert_eq!(actions.len(), 1);
    }

    #[test]
    fn success_moves_to_waiting_and_starts_poll() {
        let mut events = through_profile();
        events.push(WizardEvent::Continue);
        events.push(WizardEvent::SubmitSucceeded);
        let (state, actions) = run(WizardState::default(), events);
        assert_eq!(
            state.step,
            WizardStep::Waiting {
                just_submitted: true
            }
        );
        assert_eq!(actions.last(), Some(&WizardAction::StartVerificationPoll));

        let (state, _) = OnboardingWizard::transition(state, WizardEvent::AcknowledgeSuccess);
        assert_eq!(
            state.step,
            WizardStep::Waiting {
                just_submitted: false
            }
        );
    }

    #[test]
    fn continue_on_success_screen_returns_to_waiting() {
        let mut events = through_profile();
        events.push(WizardEvent::Continue);
        events.push(WizardEvent::SubmitSucceeded);
        events.push(WizardEvent::Continue);
        let (state, actions) = run(WizardState::default(), events);
        assert_eq!(
            state.step,
            WizardStep::Waiting {
                just_submitted: false
            }
        );
        assert_eq!(actions.last(), Some(&WizardAction::StartVerificationPoll));
    }

    #[test]
    fn failed_submit_stays_on_legal_details() {
        let mut events = through_profile();
        events.push(WizardEvent::Continue);
        events.push(WizardEvent::SubmitFailed {
            message: "Phone already registered".into(),
        });
        let (state, _) = run(WizardState::default(), events);
        assert_eq!(state.step, WizardStep::LegalDetails);
        assert!(!state.submitting);
        assert_eq!(
            state.error,
            Some(WizardError::SubmitFailed("Phone already registered".into()))
        );
    }

    #[test]
    fn back_walks_one_step() {
        let (state, _) = run(WizardState::default(), through_profile());
        let (state, _) = OnboardingWizard::transition(state, WizardEvent::Back);
        assert_eq!(state.step, WizardStep::Profile);
        let (state, _) = OnboardingWizard::transition(state, WizardEvent::Back);
        assert_eq!(state.step, WizardStep::Role);
        assert_eq!(state.draft.name, "Otieno");
    }

    #[test]
    fn rejected_record_resumes_at_step_one_with_clean_draft() {
        let record = UserRecord {
            primary_role: Some(Role::Buyer),
            roles: RoleSet::single(Role::Buyer),
            name: Some("Old".into()),
            verification_status: VerificationStatus::Rejected,
            verification_retry_count: 1,
            ..Default::default()
        };
        let (state, actions) = OnboardingWizard::resume(Some(&record));
        assert_eq!(state.step, WizardStep::Role);
        assert_eq!(state.draft, OnboardingDraft::default());
        assert_eq!(state.resubmission_of, Some(1));
        assert!(actions.is_empty());
    }

    #[test]
    fn complete_unapproved_record_resumes_waiting() {
        let record = UserRecord {
            primary_role: Some(Role::Buyer),
            roles: RoleSet::single(Role::Buyer),
            name: Some("B".into()),
            phone: Some("0700".into()),
            location: Some(Location::county("Nairobi")),
            ..Default::default()
        };
        let (state, actions) = OnboardingWizard::resume(Some(&record));
        assert_eq!(
            state.step,
            WizardStep::Waiting {
                just_submitted: false
            }
        );
        assert_eq!(actions, vec![WizardAction::StartVerificationPoll]);
    }

    #[test]
    fn rejection_while_waiting_resets_wizard() {
        let state = WizardState {
            step: WizardStep::Waiting {
                just_submitted: false,
            },
            ..WizardState::default()
        };
        let (state, actions) =
            OnboardingWizard::transition(state, WizardEvent::VerificationRejected { retry_count: 0 });
        assert_eq!(state.step, WizardStep::Role);
        assert_eq!(state.resubmission_of, Some(0));
        assert_eq!(actions, vec![WizardAction::StopVerificationPoll]);
    }
}
