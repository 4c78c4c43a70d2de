//! Business logic use cases
//!
//! Whether something is its own use case depends on whether the user has to
//! make another decision in between.
//!
//! ```text
//! navigation ─→ RouteShell ─→ RoleGate ─→ OnboardingOrchestrator ─→ AwaitVerification
//!                                  └────→ SelectPlan
//! list pages ─→ ListingFeed<R> ─→ CardController ─→ RoomSubscription
//!            └→ CreateListing<R>
//! ```

pub mod admin;
pub mod card;
pub mod gate;
pub mod listings;
pub mod matches;
pub mod messages;
pub mod navigation;
pub mod onboarding;
pub mod reviews;
pub mod sms;
pub mod transport;

pub use admin::{ReviewVerifications, VerificationReviewError};
pub use card::{CardController, CardPorts, RoomSubscription};
pub use gate::{GateCheck, GateOutcome, RoleGate, SelectPlan, SelectPlanError};
pub use listings::{CreateListing, CreateListingError, ListingFeed, RefreshOutcome};
pub use matches::{ManageMatches, MatchActionError};
pub use messages::MatchThread;
pub use navigation::{RouteShell, ShellFrame};
pub use onboarding::{AwaitVerification, OnboardingOrchestrator, VerificationOutcome};
pub use reviews::{ListReviews, ReviewError, ReviewPage, SubmitReview};
pub use sms::{SendSms, SendSmsError};
pub use transport::DriverTransport;
