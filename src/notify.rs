//! Notifier interface for mutation outcomes.
//!
//! The data layer renders nothing; on mutation success or failure it calls
//! out through this injected interface and the embedding application
//! decides how to present it (toast, status line, nothing).

use tracing::{error, info};

pub trait Notifier: Send + Sync {
  fn notify_success(&self, message: &str);
  fn notify_error(&self, message: &str);
}

/// Default notifier for headless use: routes messages to the log.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
  fn notify_success(&self, message: &str) {
    info!(message, "mutation succeeded");
  }

  fn notify_error(&self, message: &str) {
    error!(message, "mutation failed");
  }
}
