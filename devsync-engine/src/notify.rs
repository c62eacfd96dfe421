//! Notification hooks.
//!
//! The engine reports progress through an injected sink instead of a UI
//! toolkit. Calls are fire-and-forget: nothing is returned and nothing is
//! retried.

use tracing::{info, warn};

/// Sink for user-facing sync notices.
pub trait NotificationHook: Send + Sync {
    fn show_success(&self, message: &str);

    fn show_error(&self, message: &str);

    fn show_info(&self, message: &str);
}

/// Forwards notices to the log. Used on headless hosts.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl NotificationHook for TracingNotifier {
    fn show_success(&self, message: &str) {
        info!(target: "devsync::notify", "{}", message);
    }

    fn show_error(&self, message: &str) {
        warn!(target: "devsync::notify", "{}", message);
    }

    fn show_info(&self, message: &str) {
        info!(target: "devsync::notify", "{}", message);
    }
}

/// Discards every notice.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl NotificationHook for NoopNotifier {
    fn show_success(&self, _message: &str) {}

    fn show_error(&self, _message: &str) {}

    fn show_info(&self, _message: &str) {}
}
