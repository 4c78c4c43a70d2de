//! AgriLink Application Orchestration Layer
//!
//! This crate contains the client use cases: the role gate and route shell,
//! the onboarding wizard orchestrator with its verification poll, listing
//! feeds, list cards and the marketplace actions around matches, messages,
//! reviews, SMS and admin verification.

pub mod deps;
pub mod usecases;

pub use deps::AppDeps;
