//! Toast notifications: the single user-visible failure/success channel.

use std::time::Duration;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub severity: Severity,
    pub message: String,
    /// `None` keeps the toast until dismissed.
    pub auto_dismiss: Option<Duration>,
}

pub const DEFAULT_DISMISS: Duration = Duration::from_secs(4);

impl Toast {
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            auto_dismiss: Some(DEFAULT_DISMISS),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Severity::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn sticky(mut self) -> Self {
        self.auto_dismiss = None;
        self
    }

    pub fn dismiss_after(mut self, after: Duration) -> Self {
        self.auto_dismiss = Some(after);
        self
    }
}
