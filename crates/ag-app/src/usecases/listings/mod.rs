//! Listing pages: filtered feeds and create forms.

mod create;
mod feed;

pub use create::{CreateListing, CreateListingError};
pub use feed::{ListingFeed, RefreshOutcome};
