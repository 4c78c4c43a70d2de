//! Route shell: wraps every page in the role gate and decides whether the
//! header and footer are shown.

use std::sync::Arc;

use tracing::debug;

use ag_core::gate::GateView;
use ag_core::routes::Route;

use super::gate::{GateCheck, GateOutcome, RoleGate};

/// What the shell puts on screen after a navigation.
#[derive(Debug, Clone, PartialEq)]
pub struct ShellFrame {
    pub route: Route,
    pub view: GateView,
    pub chrome: bool,
    pub redirect: Option<Route>,
}

impl ShellFrame {
    fn from_outcome(outcome: &GateOutcome) -> Self {
        Self {
            route: outcome.route.clone(),
            view: outcome.view(),
            chrome: outcome.state.shows_chrome(&outcome.route),
            redirect: outcome.redirect.clone(),
        }
    }
}

pub struct RouteShell {
    gate: Arc<RoleGate>,
}

impl RouteShell {
    pub fn new(gate: Arc<RoleGate>) -> Self {
        Self { gate }
    }

    /// Navigates to `path`, following gate redirects until the gate settles.
    ///
    /// Returns the frames rendered along the way, the last one being the
    /// page that ends up on screen. Unknown paths first yield a redirect frame
    /// to home. An overlapping navigation yields a single loading frame.
    pub async fn navigate(&self, path: &str) -> Vec<ShellFrame> {
        let mut frames = Vec::new();
        let mut next = path.to_string();

        if Route::parse(path).is_none() {
            debug!(path, "unknown path, redirecting home");
            frames.push(ShellFrame {
                chrome: self.gate.state().shows_chrome(&Route::Home),
                route: Route::Home,
                view: GateView::Nothing,
                redirect: Some(Route::Home),
            });
            next = Route::Home.path();
        }

        // A redirect target never redirects back: every target is an allowed
        // page of the state that produced it.
        for _ in 0..4 {
            match self.gate.on_path_changed(&next).await {
                GateCheck::Completed(outcome) => {
                    let frame = ShellFrame::from_outcome(&outcome);
                    let redirect = frame.redirect.clone();
                    frames.push(frame);
                    match redirect {
                        Some(to) => {
                            debug!(from = %outcome.route, to = %to, "shell following redirect");
                            next = to.path();
                        }
                        None => break,
                    }
                }
                GateCheck::Skipped => {
                    let route = Route::resolve(&next);
                    frames.push(ShellFrame {
                        chrome: self.gate.state().shows_chrome(&route),
                        route,
                        view: GateView::Loading,
                        redirect: None,
                    });
                    break;
                }
            }
        }
        frames
    }
}
