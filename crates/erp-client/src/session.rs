//! Session lifecycle hooks
//!
//! The pipeline tears the session down on terminal authentication failures
//! and surfaces one user-visible notice per business or transport error.
//! What those mean concretely belongs to the embedding application: a
//! desktop shell redirects to its sign-in screen, a batch job aborts.
//! [`LoggingHooks`] is the default and only logs.

use tracing::warn;

/// Callbacks the pipeline invokes on user-relevant events.
pub trait SessionHooks: Send + Sync {
    /// One notice per surfaced business or transport error. The message is
    /// already user-facing (backend message or the fixed status table).
    fn notify_error(&self, message: &str);

    /// The session is gone: stored credentials were cleared and the user
    /// must sign in again. May be invoked redundantly when terminal
    /// failures race, so implementations must be idempotent.
    fn on_session_expired(&self);
}

/// Default hooks that log and do nothing else.
#[derive(Debug, Default)]
pub struct LoggingHooks;

impl SessionHooks for LoggingHooks {
    fn notify_error(&self, message: &str) {
        warn!(message, "request failed");
    }

    fn on_session_expired(&self) {
        warn!("session expired, sign-in required");
    }
}
