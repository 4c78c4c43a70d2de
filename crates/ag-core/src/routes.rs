//! Client-side routing surface.
//!
//! Paths are parsed into [`Route`] values once; everything downstream (the
//! gate, the route shell) works on the typed route.

use std::fmt;

use crate::ids::UserId;
use crate::user::Role;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    // Public
    Home,
    Safety,
    Faq,
    Terms,
    Contact,
    Reviews(UserId),

    // Protected
    Produce,
    Demand,
    Matches,
    Messages,
    Transport,
    Profile,
    Onboarding,
    VerificationStatus,
    Sms,
    Admin,
    MyProduce,
    MyDemands,
    MyTransport,
    PremiumPayment,
    PlanSelection,
    OnboardingSuccess,
}

const STATIC_ROUTES: [(&str, Route); 21] = [
    ("/", Route::Home),
    ("/safety", Route::Safety),
    ("/faq", Route::Faq),
    ("/terms", Route::Terms),
    ("/contact", Route::Contact),
    ("/produce", Route::Produce),
    ("/demand", Route::Demand),
    ("/matches", Route::Matches),
    ("/messages", Route::Messages),
    ("/transport", Route::Transport),
    ("/profile", Route::Profile),
    ("/onboarding", Route::Onboarding),
    ("/verification-status", Route::VerificationStatus),
    ("/sms", Route::Sms),
    ("/admin", Route::Admin),
    ("/my-produce", Route::MyProduce),
    ("/my-demands", Route::MyDemands),
    ("/my-transport", Route::MyTransport),
    ("/premium/payment", Route::PremiumPayment),
    ("/plan-selection", Route::PlanSelection),
    ("/onboarding-success", Route::OnboardingSuccess),
];

impl Route {
    /// Parses a browser-style path. Query strings, fragments and trailing
    /// slashes are ignored. Returns `None` for unknown paths.
    pub fn parse(path: &str) -> Option<Route> {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim();
        let trimmed = path.trim_end_matches('/');
        let normalized = if trimmed.is_empty() { "/" } else { trimmed };

        if let Some((_, route)) = STATIC_ROUTES.iter().find(|(p, _)| *p == normalized) {
            return Some(route.clone());
        }

        let id = normalized.strip_prefix("/reviews/")?;
        if id.is_empty() || id.contains('/') {
            return None;
        }
        Some(Route::Reviews(UserId::from(id)))
    }

    /// Resolves a path, sending unknown paths to home.
    pub fn resolve(path: &str) -> Route {
        Self::parse(path).unwrap_or(Route::Home)
    }

    pub fn path(&self) -> String {
        match self {
            Route::Reviews(id) => format!("/reviews/{id}"),
            other => STATIC_ROUTES
                .iter()
                .find(|(_, r)| r == other)
                .map(|(p, _)| (*p).to_string())
                .unwrap_or_else(|| "/".to_string()),
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(
            self,
            Route::Home
                | Route::Safety
                | Route::Faq
                | Route::Terms
                | Route::Contact
                | Route::Reviews(_)
        )
    }

    pub fn is_protected(&self) -> bool {
        !self.is_public()
    }

    /// Routes that belong to the onboarding funnel rather than the app proper.
    pub fn is_onboarding_funnel(&self) -> bool {
        matches!(
            self,
            Route::Onboarding
                | Route::PlanSelection
                | Route::OnboardingSuccess
                | Route::VerificationStatus
        )
    }

    /// Where a fully onboarded user lands after leaving the funnel.
    pub fn landing_for(role: Option<Role>) -> Route {
        match role {
            Some(Role::Farmer) => Route::Produce,
            Some(Role::Buyer) => Route::Demand,
            Some(Role::Driver) => Route::Transport,
            _ => Route::Home,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
