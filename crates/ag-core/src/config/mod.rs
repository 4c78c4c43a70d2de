//! # Pure Data Module - Data Transfer Objects Only
//!
//! ## Responsibilities
//!
//! - Define the client configuration data structure
//!
//! ## Prohibited
//!
//! - No validation logic
//! - No default value calculation (defaults live in the infra loader)

use serde::Deserialize;

/// Client configuration DTO (pure data, no logic).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    /// REST base, including the `/api` prefix.
    pub api_url: String,

    /// Realtime (Socket.IO) base URL.
    pub socket_url: String,

    /// Identity provider publishable key. Carried for the sign-in surface;
    /// the client itself only consumes bearer tokens.
    pub clerk_publishable_key: String,

    /// Bearer token of the signed-in user, if any.
    pub session_token: Option<String>,

    /// Interval of the verification poll on the waiting screen.
    pub verification_poll_secs: u64,

    /// Window that coalesces consecutive navigation events.
    pub gate_debounce_ms: u64,

    /// Auto-dismiss delay of toasts.
    pub toast_dismiss_ms: u64,

    /// Default `limit` of matching suggestions.
    pub suggestion_limit: u32,
}
