//! Repeat-until-terminal polling loop.
//!
//! One poll session owns one task id. Every tick opens a fresh status
//! connection rather than holding a long-lived channel; that trades
//! per-tick connection overhead for not having to run a reconnection state
//! machine. Attempts are strictly sequential - a tick's attempt is awaited
//! to settlement (or force-closed by the lifetime cap) before the next one
//! starts.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use genwatch_core::{StatusUpdate, TaskId, TaskStatus};

use crate::config::PollConfig;
use crate::connection::{self, ConnectionOutcome, StatusConnection};
use crate::error::ClientError;
use crate::observer::TaskObserver;

/// Whether the session keeps ticking after an outcome.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// Per-task state owned by a running session.
struct PollSession {
    task_id: TaskId,
    url: String,
    tick_interval: Duration,
    attempt_lifetime: Duration,
    last_status: Option<TaskStatus>,
}

/// Handle to a running poll session.
///
/// Cancelling stops future ticks and force-closes any in-flight attempt;
/// it is idempotent, and no observer callbacks fire afterwards. Dropping
/// the handle cancels the session.
#[derive(Debug)]
pub struct PollHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Stop the session. Safe to call any number of times.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait until the session ends (terminal status, auth/not-found
    /// rejection, or cancellation).
    pub async fn wait(mut self) {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Start polling the status of `task_id` until it reaches a terminal state.
///
/// The credential is captured now; an absent credential fails fast with
/// [`ClientError::CredentialMissing`] before any network activity. Each
/// task id should have at most one active session - restart by cancelling
/// the previous handle first.
pub fn start_polling(
    task_id: TaskId,
    config: PollConfig,
    observer: Arc<dyn TaskObserver>,
) -> Result<PollHandle, ClientError> {
    if config.credential.trim().is_empty() {
        return Err(ClientError::CredentialMissing);
    }
    if config.endpoint.trim().is_empty() {
        return Err(ClientError::InvalidEndpoint(
            "endpoint must not be empty".to_string(),
        ));
    }

    let session = PollSession {
        task_id,
        url: connection::status_url(&config.endpoint, task_id, &config.credential, &config.locale),
        tick_interval: config.tick_interval,
        attempt_lifetime: config.attempt_lifetime,
        last_status: None,
    };

    let cancel = CancellationToken::new();
    let task = tokio::spawn(run_session(session, observer, cancel.clone()));

    info!(task_id = %task_id, "started status polling");
    Ok(PollHandle {
        cancel,
        task: Some(task),
    })
}

async fn run_session(
    mut session: PollSession,
    observer: Arc<dyn TaskObserver>,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(session.tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!(task_id = %session.task_id, "poll session cancelled");
                return;
            }
            _ = ticker.tick() => {}
        }

        // Cancellation drops the in-flight attempt, closing its socket.
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!(task_id = %session.task_id, "poll session cancelled mid-attempt");
                return;
            }
            flow = run_tick(&mut session, &observer) => {
                if flow == Flow::Stop {
                    return;
                }
            }
        }
    }
}

/// One connection attempt: open, drain outcomes, enforce the lifetime cap.
async fn run_tick(session: &mut PollSession, observer: &Arc<dyn TaskObserver>) -> Flow {
    // The handshake gets the same cap as the open connection; a peer that
    // accepts TCP but never finishes upgrading must not stall the session.
    let open = tokio::time::timeout(
        session.attempt_lifetime,
        StatusConnection::open(&session.url, session.task_id),
    );
    let conn = match open.await {
        Ok(Ok(conn)) => conn,
        Ok(Err(err)) => {
            debug!(task_id = %session.task_id, %err, "status connection failed, retrying next tick");
            return Flow::Continue;
        }
        Err(_) => {
            debug!(task_id = %session.task_id, "handshake timed out, retrying next tick");
            return Flow::Continue;
        }
    };

    let (tx, mut rx) = mpsc::unbounded_channel();
    let drive = conn.drive(tx);
    tokio::pin!(drive);
    // Lifetime cap runs from successful open.
    let cap = tokio::time::sleep(session.attempt_lifetime);
    tokio::pin!(cap);
    let mut settled = false;

    loop {
        tokio::select! {
            _ = &mut cap => {
                debug!(task_id = %session.task_id, "attempt hit lifetime cap, closing connection");
                return Flow::Continue;
            }
            _ = &mut drive, if !settled => {
                settled = true;
            }
            outcome = rx.recv() => match outcome {
                Some(outcome) => {
                    if session.handle_outcome(observer, outcome).await == Flow::Stop {
                        return Flow::Stop;
                    }
                }
                // Attempt settled and every outcome was drained.
                None => return Flow::Continue,
            },
        }
    }
}

impl PollSession {
    /// Single decision point for everything an attempt can produce.
    async fn handle_outcome(
        &mut self,
        observer: &Arc<dyn TaskObserver>,
        outcome: ConnectionOutcome,
    ) -> Flow {
        match outcome {
            ConnectionOutcome::Update(StatusUpdate { status, logs }) => {
                if self.last_status.as_ref() != Some(&status) {
                    info!(task_id = %self.task_id, %status, "task status changed");
                }
                observer.on_status_update(&status, &logs).await;
                let terminal = status.is_terminal();
                self.last_status = Some(status);
                if terminal {
                    observer.on_complete().await;
                    return Flow::Stop;
                }
                Flow::Continue
            }
            ConnectionOutcome::AuthError => {
                warn!(task_id = %self.task_id, "status connection rejected: authentication failed");
                observer.on_auth_error().await;
                Flow::Stop
            }
            ConnectionOutcome::NotFound => {
                warn!(task_id = %self.task_id, "status connection rejected: task not found");
                observer.on_not_found().await;
                Flow::Stop
            }
            ConnectionOutcome::ClosedNormally => {
                debug!(task_id = %self.task_id, "connection closed before a terminal status");
                Flow::Continue
            }
            ConnectionOutcome::Transport(detail) => {
                debug!(task_id = %self.task_id, %detail, "transient transport error, retrying next tick");
                Flow::Continue
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    #[async_trait::async_trait]
    impl TaskObserver for Noop {}

    #[tokio::test]
    async fn test_missing_credential_fails_fast() {
        let config = PollConfig::new("http://127.0.0.1:1/base", "");
        let err = start_polling(TaskId::new(1), config, Arc::new(Noop)).unwrap_err();
        assert!(matches!(err, ClientError::CredentialMissing));
    }

    #[tokio::test]
    async fn test_blank_credential_fails_fast() {
        let config = PollConfig::new("http://127.0.0.1:1/base", "   ");
        let err = start_polling(TaskId::new(1), config, Arc::new(Noop)).unwrap_err();
        assert!(matches!(err, ClientError::CredentialMissing));
    }

    #[tokio::test]
    async fn test_empty_endpoint_fails_fast() {
        let config = PollConfig::new("", "token");
        let err = start_polling(TaskId::new(1), config, Arc::new(Noop)).unwrap_err();
        assert!(matches!(err, ClientError::InvalidEndpoint(_)));
    }
}
