//! reqwest adapters for the REST ports.
//!
//! One [`ApiClient`] implements every REST-backed port; each file holds the
//! impls for one resource family.

mod client;
mod marketplace;
mod matches;
mod messaging;
mod users;

pub use client::ApiClient;
