//! Marketplace resources: produce listings, demands, transport offers,
//! matches, messages, reviews and SMS.

pub mod demand;
pub mod linked;
pub mod matching;
pub mod message;
pub mod produce;
pub mod resource;
pub mod review;
pub mod sms;
pub mod transport;

pub use demand::{Demand, DemandDraft};
pub use linked::{HasUserId, Linked, UserRef, UserSummary};
pub use matching::{
    AssignDriver, Match, MatchCommand, MatchStatus, MatchSuggestion, NewMatch, SuggestionQuery,
};
pub use message::{Message, NewMessage};
pub use produce::{Produce, ProduceDraft, MIN_PRODUCE_IMAGES};
pub use resource::{ListingDraft, Resource};
pub use review::{average_rating, NewReview, Review, ReviewValidationError};
pub use sms::{SmsRequest, SmsValidationError};
pub use transport::{TransportDraft, TransportOffer, TransportSuggestion};

/// Client-side validation failure of a create form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListingValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),
    #[error("at least {min} photo(s) required, got {got}")]
    TooFewImages { min: usize, got: usize },
}
