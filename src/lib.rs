//! AgriLink marketplace client
//!
//! Command-line front end over the `ag-app` use cases: role gate,
//! onboarding wizard, listings, cards and match chat.

pub mod bootstrap;
pub mod cli;
pub mod output;
