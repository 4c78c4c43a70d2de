use std::time::Duration;

use tracing::{error, info, warn};

use ag_core::notify::{Severity, Toast, DEFAULT_DISMISS};
use ag_core::ports::NotifierPort;

/// Surfaces toasts as log records on the `agrilink::toast` target.
#[derive(Debug, Clone, Copy)]
pub struct TracingNotifier {
    dismiss_after: Duration,
}

impl Default for TracingNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_DISMISS)
    }
}

impl TracingNotifier {
    /// `dismiss_after` replaces the delay of auto-dismissing toasts; sticky
    /// toasts stay sticky.
    pub fn new(dismiss_after: Duration) -> Self {
        Self { dismiss_after }
    }

    fn settle(&self, toast: Toast) -> Toast {
        match toast.auto_dismiss {
            Some(_) => toast.dismiss_after(self.dismiss_after),
            None => toast,
        }
    }
}

impl NotifierPort for TracingNotifier {
    fn notify(&self, toast: Toast) {
        let toast = self.settle(toast);
        let dismiss_ms = toast.auto_dismiss.map(|after| after.as_millis() as u64);
        match toast.severity {
            Severity::Success | Severity::Info => {
                info!(target: "agrilink::toast", ?dismiss_ms, "{}", toast.message)
            }
            Severity::Warning => warn!(target: "agrilink::toast", ?dismiss_ms, "{}", toast.message),
            Severity::Error => error!(target: "agrilink::toast", ?dismiss_ms, "{}", toast.message),
        }
    }
}
