//! # ag-core
//!
//! Core domain models and business logic for the AgriLink marketplace client.
//!
//! This crate contains the pure parts of the client: the role gate and
//! onboarding wizard state machines, listing filters, card disclosure, the
//! marketplace resource models and the ports the application layer drives.
//! It performs no I/O.

pub mod card;
pub mod config;
pub mod filters;
pub mod gate;
pub mod ids;
pub mod marketplace;
pub mod notify;
pub mod onboarding;
pub mod ports;
pub mod realtime;
pub mod routes;
pub mod user;

// Re-export commonly used types at the crate root
pub use config::AppConfig;
pub use filters::{FilterValue, Filters};
pub use gate::{GateDecision, GateState, OnboardingPhase, RoleGateMachine};
pub use ids::{DemandId, ListingId, MatchId, MessageId, ReviewId, TransportId, UserId};
pub use routes::Route;
pub use user::{Capability, Role, RoleSet, Tier, UserRecord, VerificationStatus};
