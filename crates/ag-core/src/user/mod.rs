//! User profile domain: roles, capabilities, locations and the onboarding
//! view-model projected from the backend user record.

pub mod location;
pub mod record;
pub mod role;

pub use location::{canonical_county, Location, COUNTIES};
pub use record::{
    ProfileField, ProfileUpdate, Tier, UserRecord, VerificationDecision, VerificationStatus,
};
pub use role::{Capability, Role, RoleSet, UnknownRole};
