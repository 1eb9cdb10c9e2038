//! Callback contract between the poller and its consumer.

use async_trait::async_trait;
use genwatch_core::TaskStatus;

/// Observer notified as a poll session progresses.
///
/// All methods default to no-ops, so consumers implement only what they
/// care about. The poller guarantees `on_complete`, `on_auth_error`, and
/// `on_not_found` each fire at most once per session, and that nothing
/// fires after cancellation.
#[async_trait]
pub trait TaskObserver: Send + Sync + 'static {
    /// A status snapshot arrived. `logs` is the full tail as of this
    /// snapshot; replace any previously displayed list with it.
    async fn on_status_update(&self, status: &TaskStatus, logs: &[String]) {
        let _ = (status, logs);
    }

    /// The task reached a terminal status (`created` or `failed`).
    async fn on_complete(&self) {}

    /// The server rejected the credential. Re-authentication is the
    /// consumer's concern; the session has already stopped.
    async fn on_auth_error(&self) {}

    /// The server does not know the task id.
    async fn on_not_found(&self) {}
}
