// Error-notification policy.
//
// Every failed request is logged. Mutations additionally surface a
// user-visible notification, but only for the first NOTIFICATION_CAP
// failures of the process. The counter is monotonic and never resets.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};

use tracing::{error, warn};

use crate::error::Error;

/// Maximum number of notifications shown over the process lifetime.
pub const NOTIFICATION_CAP: u64 = 3;

static PROCESS_ERROR_COUNT: LazyLock<Arc<AtomicU64>> =
    LazyLock::new(|| Arc::new(AtomicU64::new(0)));

/// A user-facing error notification (a toast, in a GUI).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
}

/// Sink for user-visible notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Notifier that emits notifications as `warn` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: &Notification) {
        warn!(
            target: "printdesk::notification",
            title = %notification.title,
            "{}",
            notification.description
        );
    }
}

/// Logs every failure and shows a capped number of notifications.
#[derive(Clone)]
pub struct ErrorPolicy {
    counter: Arc<AtomicU64>,
    notifier: Arc<dyn Notifier>,
}

impl ErrorPolicy {
    /// Policy backed by the process-wide counter.
    pub fn process_wide(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            counter: Arc::clone(&PROCESS_ERROR_COUNT),
            notifier,
        }
    }

    /// Policy with its own counter, independent of the process-wide one.
    pub fn isolated(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            counter: Arc::new(AtomicU64::new(0)),
            notifier,
        }
    }

    /// Number of failures reported through this policy's counter.
    pub fn error_count(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }

    /// Record a failure on `endpoint`. Returns `true` if a notification
    /// was shown.
    pub fn report(&self, endpoint: &str, err: &Error, notify: bool) -> bool {
        let count = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        error!(endpoint, error = %err, count, "API error");

        if notify && count <= NOTIFICATION_CAP {
            self.notifier.notify(&Notification {
                title: "API error".into(),
                description: err.user_message(),
            });
            return true;
        }
        false
    }
}

impl Default for ErrorPolicy {
    fn default() -> Self {
        Self::process_wide(Arc::new(TracingNotifier))
    }
}

impl std::fmt::Debug for ErrorPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorPolicy")
            .field("error_count", &self.error_count())
            .finish_non_exhaustive()
    }
}
