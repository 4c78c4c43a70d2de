mod await_verification;
mod orchestrator;

pub use await_verification::{AwaitVerification, VerificationOutcome, DEFAULT_POLL_INTERVAL};
pub use orchestrator::OnboardingOrchestrator;
