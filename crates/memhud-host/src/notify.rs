//! User-facing notification capability.

use tracing::warn;

/// User-visible warnings raised by widgets. An embedding host renders
/// these as toasts; tests supply a recording fake.
pub trait Notifier: Send + Sync {
    fn warn(&self, message: &str);
}

/// Routes warnings to the log when no toast layer is attached.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn warn(&self, message: &str) {
        warn!("{message}");
    }
}
