//! Onboarding wizard orchestrator.
//!
//! ```text
//! user input / poll decisions
//!   ↓
//! OnboardingOrchestrator (serializes dispatch)
//!   ↓
//! OnboardingWizard (pure transitions)
//!   ↓
//! WizardAction (profile write, verification poll)
//! ```

use std::path::Path;
use std::sync::Arc;

use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

use ag_core::notify::Toast;
use ag_core::onboarding::{OnboardingWizard, WizardAction, WizardEvent, WizardState};
use ag_core::ports::{ImageEncodeError, ImageEncoderPort, NotifierPort, UserProfilePort};
use ag_core::user::ProfileUpdate;

use super::await_verification::{AwaitVerification, VerificationOutcome};

struct PollTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Drives the wizard state machine and its side effects.
pub struct OnboardingOrchestrator {
    profile: Arc<dyn UserProfilePort>,
    images: Arc<dyn ImageEncoderPort>,
    notifier: Arc<dyn NotifierPort>,
    poll: Arc<AwaitVerification>,

    /// Current state; held for the whole dispatch so transitions and their
    /// actions run one at a time.
    state: Mutex<WizardState>,
    updates: watch::Sender<WizardState>,

    poll_task: std::sync::Mutex<Option<PollTask>>,
    decisions_tx: mpsc::UnboundedSender<WizardEvent>,
    decisions_rx: Mutex<mpsc::UnboundedReceiver<WizardEvent>>,
}

impl OnboardingOrchestrator {
    pub fn new(
        profile: Arc<dyn UserProfilePort>,
        images: Arc<dyn ImageEncoderPort>,
        notifier: Arc<dyn NotifierPort>,
        poll: AwaitVerification,
    ) -> Self {
        let (updates, _) = watch::channel(WizardState::default());
        let (decisions_tx, decisions_rx) = mpsc::unbounded_channel();
        Self {
            profile,
            images,
            notifier,
            poll: Arc::new(poll),
            state: Mutex::new(WizardState::default()),
            updates,
            poll_task: std::sync::Mutex::new(None),
            decisions_tx,
            decisions_rx: Mutex::new(decisions_rx),
        }
    }

    /// Observe every state the wizard passes through.
    pub fn subscribe(&self) -> watch::Receiver<WizardState> {
        self.updates.subscribe()
    }

    pub fn current(&self) -> WizardState {
        self.updates.borrow().clone()
    }

    /// Positions the wizard from the user's current record.
    ///
    /// A failed fetch starts from an empty wizard.
    pub async fn resume(&self) -> WizardState {
        let span = info_span!("usecase.onboarding.resume");
        async {
            let record = match self.profile.current_user().await {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!(error = %err, "could not load profile, starting fresh");
                    None
                }
            };

            let mut state = self.state.lock().await;
            let (next, actions) = OnboardingWizard::resume(record.as_ref());
            info!(step = ?next.step, "onboarding resumed");
            self.publish(&mut state, next);

            let follow_up = self.execute_actions(actions).await;
            self.run(&mut state, follow_up).await;
            state.clone()
        }
        .instrument(span)
        .await
    }

    pub async fn dispatch(&self, event: WizardEvent) -> WizardState {
        let span = info_span!("usecase.onboarding.dispatch", event = ?event);
        async {
            let mut state = self.state.lock().await;
            self.run(&mut state, vec![event]).await;
            state.clone()
        }
        .instrument(span)
        .await
    }

    /// Encodes an ID document and attaches it to the legal-details step.
    pub async fn attach_id_image(&self, path: &Path) -> Result<WizardState, ImageEncodeError> {
        let data_url = match self.images.encode_data_url(path).await {
            Ok(data_url) => data_url,
            Err(err) => {
                self.notifier.notify(Toast::error(err.to_string()));
                return Err(err);
            }
        };
        Ok(self.dispatch(WizardEvent::AttachIdImage { data_url }).await)
    }

    /// Waits for the running verification poll to observe a decision and
    /// applies it. Returns `None` when no poll is running.
    pub async fn next_decision(&self) -> Option<WizardState> {
        let event = {
            let mut decisions = self.decisions_rx.lock().await;
            match decisions.try_recv() {
                Ok(event) => event,
                Err(_) if !self.is_polling() => return None,
                Err(_) => decisions.recv().await?,
            }
        };
        Some(self.dispatch(event).await)
    }

    pub fn is_polling(&self) -> bool {
        self.poll_task
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }

    /// Stops the verification poll, if any.
    pub fn shutdown(&self) {
        self.stop_poll();
    }

    async fn run(&self, state: &mut WizardState, events: Vec<WizardEvent>) {
        let mut pending = events;
        while let Some(event) = pending.pop() {
            let from = state.step;
            let (next, actions) = OnboardingWizard::transition(state.clone(), event);
            info!(from = ?from, to = ?next.step, "onboarding state transition");
            self.publish(state, next);
            pending.extend(self.execute_actions(actions).await);
        }
    }

    fn publish(&self, state: &mut WizardState, next: WizardState) {
        *state = next;
        self.updates.send_replace(state.clone());
    }

    async fn execute_actions(&self, actions: Vec<WizardAction>) -> Vec<WizardEvent> {
        let mut follow_up = Vec::new();
        for action in actions {
            debug!(?action, "onboarding executing action");
            match action {
                WizardAction::SubmitProfile { update } => {
                    follow_up.push(self.submit(update).await);
                }
                WizardAction::StartVerificationPoll => self.start_poll(),
                WizardAction::StopVerificationPoll => self.stop_poll(),
            }
        }
        follow_up
    }

    async fn submit(&self, update: ProfileUpdate) -> WizardEvent {
        match self.profile.update_current_user(&update).await {
            Ok(_) => {
                info!("onboarding submitted");
                self.notifier
                    .notify(Toast::success("Profile submitted for verification"));
                WizardEvent::SubmitSucceeded
            }
            Err(err) => {
                warn!(error = %err, "onboarding submit failed");
                let message = err.user_message();
                self.notifier.notify(Toast::error(message.clone()));
                WizardEvent::SubmitFailed { message }
            }
        }
    }

    fn start_poll(&self) {
        self.stop_poll();

        let cancel = CancellationToken::new();
        let poll = self.poll.clone();
        let notifier = self.notifier.clone();
        let decisions = self.decisions_tx.clone();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            let event = match poll.execute(token).await {
                Some(VerificationOutcome::Approved(_)) => {
                    notifier.notify(Toast::success("Your account has been verified"));
                    WizardEvent::VerificationApproved
                }
                Some(VerificationOutcome::Rejected(record)) => {
                    let reason = record
                        .verification_rejected_reason
                        .unwrap_or_else(|| "no reason given".to_string());
                    notifier.notify(
                        Toast::warning(format!("Verification rejected: {reason}")).sticky(),
                    );
                    WizardEvent::VerificationRejected {
                        retry_count: record.verification_retry_count,
                    }
                }
                None => return,
            };
            let _ = decisions.send(event);
        });

        if let Ok(mut slot) = self.poll_task.lock() {
            *slot = Some(PollTask { cancel, handle });
        }
    }

    fn stop_poll(&self) {
        let task = self.poll_task.lock().ok().and_then(|mut slot| slot.take());
        if let Some(task) = task {
            task.cancel.cancel();
            if !task.handle.is_finished() {
                debug!("verification poll stopped");
            }
        }
    }
}

impl Drop for OnboardingOrchestrator {
    fn drop(&mut self) {
        self.stop_poll();
    }
}
