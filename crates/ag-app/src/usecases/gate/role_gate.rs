//! Role gate orchestrator.
//!
//! Feeds navigation and profile-fetch results into [`RoleGateMachine`] and
//! executes the actions it returns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

use ag_core::gate::{GateAction, GateEvent, GateState, GateView, RoleGateMachine};
use ag_core::ports::{SessionPort, UserProfilePort};
use ag_core::routes::Route;
use ag_core::user::UserRecord;

/// Default window that coalesces consecutive path changes.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(10);

/// Result of a completed gate check.
#[derive(Debug, Clone, PartialEq)]
pub struct GateOutcome {
    /// Route the check was run for.
    pub route: Route,
    pub state: GateState,
    pub redirect: Option<Route>,
    /// Record the decision was derived from, `None` when the fetch failed
    /// or the user is signed out.
    pub record: Option<UserRecord>,
}

impl GateOutcome {
    pub fn view(&self) -> GateView {
        match (&self.state, &self.redirect) {
            (GateState::Checking, _) => GateView::Loading,
            (_, Some(_)) => GateView::Nothing,
            (_, None) => GateView::Render(self.route.clone()),
        }
    }

    /// Route the user ends up on.
    pub fn destination(&self) -> &Route {
        self.redirect.as_ref().unwrap_or(&self.route)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GateCheck {
    Completed(GateOutcome),
    /// Another check was in flight; this one did nothing.
    Skipped,
}

impl GateCheck {
    pub fn outcome(&self) -> Option<&GateOutcome> {
        match self {
            GateCheck::Completed(outcome) => Some(outcome),
            GateCheck::Skipped => None,
        }
    }
}

/// Releases the in-flight flag when dropped.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Decides, on every navigation, whether the signed-in user may see the
/// requested page.
pub struct RoleGate {
    profile: Arc<dyn UserProfilePort>,
    session: Arc<dyn SessionPort>,
    state: Mutex<GateState>,
    in_flight: AtomicBool,
    debounce: Duration,
}

impl RoleGate {
    pub fn new(profile: Arc<dyn UserProfilePort>, session: Arc<dyn SessionPort>) -> Self {
        Self {
            profile,
            session,
            state: Mutex::new(GateState::Checking),
            in_flight: AtomicBool::new(false),
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn state(&self) -> GateState {
        *self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Runs a check for a freshly navigated path. Unknown paths resolve
    /// to the home page.
    pub async fn on_path_changed(&self, path: &str) -> GateCheck {
        let route = Route::resolve(path);
        self.check(route.clone(), GateEvent::PathChanged { route })
            .await
    }

    /// Re-checks the current route after the window regained focus.
    pub async fn on_focus_regained(&self, route: Route) -> GateCheck {
        self.check(route.clone(), GateEvent::FocusRegained { route })
            .await
    }

    async fn check(&self, route: Route, event: GateEvent) -> GateCheck {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            debug!(route = %route, "gate check already in flight, skipping");
            return GateCheck::Skipped;
        };

        let span = info_span!("usecase.role_gate.check", route = %route);
        async {
            let mut pending = vec![event];
            let mut redirect = None;
            let mut record = None;

            while let Some(event) = pending.pop() {
                let from = self.state();
                let (next, actions) = RoleGateMachine::transition(from, event);
                info!(from = ?from, to = ?next, "gate state transition");
                self.set_state(next);

                for action in actions {
                    debug!(?action, "gate executing action");
                    match action {
                        GateAction::FetchProfile { route } => {
                            let (event, fetched) = self.fetch_profile(route).await;
                            record = fetched;
                            pending.push(event);
                        }
                        GateAction::Redirect { to } => redirect = Some(to),
                    }
                }
            }

            if let Some(to) = &redirect {
                info!(to = %to, "gate redirect");
            }

            GateCheck::Completed(GateOutcome {
                route,
                state: self.state(),
                redirect,
                record,
            })
        }
        .instrument(span)
        .await
    }

    async fn fetch_profile(&self, route: Route) -> (GateEvent, Option<UserRecord>) {
        if !self.session.is_signed_in() {
            return (GateEvent::SignedOut { route }, None);
        }

        match self.profile.current_user().await {
            Ok(record) => (
                GateEvent::ProfileLoaded {
                    route,
                    record: Box::new(record.clone()),
                },
                Some(record),
            ),
            Err(err) if err.is_not_found() => {
                info!("user record not created yet");
                (GateEvent::ProfileFailed { route }, None)
            }
            Err(err) => {
                warn!(error = %err, "profile fetch failed");
                (GateEvent::ProfileFailed { route }, None)
            }
        }
    }

    fn set_state(&self, state: GateState) {
        *self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = state;
    }

    /// Consumes navigation events until `paths` closes or `cancel` fires.
    ///
    /// Paths arriving within the debounce window of each other are coalesced
    /// so only the latest is checked.
    pub async fn drive(
        &self,
        mut paths: mpsc::Receiver<String>,
        outcomes: mpsc::Sender<GateOutcome>,
        cancel: CancellationToken,
    ) {
        loop {
            let mut latest = tokio::select! {
                _ = cancel.cancelled() => break,
                path = paths.recv() => match path {
                    Some(path) => path,
                    None => break,
                },
            };

            let mut closed = false;
            loop {
                match tokio::time::timeout(self.debounce, paths.recv()).await {
                    Ok(Some(path)) => {
                        debug!(superseded = %latest, by = %path, "coalescing navigation");
                        latest = path;
                    }
                    Ok(None) => {
                        closed = true;
                        break;
                    }
                    Err(_) => break,
                }
            }

            if let GateCheck::Completed(outcome) = self.on_path_changed(&latest).await {
                if outcomes.send(outcome).await.is_err() {
                    break;
                }
            }

            if closed {
                break;
            }
        }
        debug!("gate navigation driver stopped");
    }
}
