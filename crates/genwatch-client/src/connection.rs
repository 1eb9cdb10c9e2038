//! One attempt to read status snapshots over the task status channel.
//!
//! A connection is addressed to a single task id and lives for at most one
//! poll tick. Inbound frames are decoded by the interpreter; how the
//! transport closes is classified into an outcome the poller acts on. No
//! retry happens here - that is the poller's job.

use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::debug;

use genwatch_core::{interpret, StatusUpdate, TaskId};

/// Close-reason marker for a rejected credential.
///
/// The server signals auth and not-found rejections with close code 1003
/// and a human-readable reason; these markers are a versioned wire contract
/// with the collaborator service, matched by substring.
pub const AUTH_FAILED_MARKER: &str = "Authentication failed";

/// Close-reason marker for an unknown task id.
pub const TASK_NOT_FOUND_MARKER: &str = "Task not found";

/// What a single connection attempt produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionOutcome {
    /// A decoded status snapshot. An attempt may yield several of these.
    Update(StatusUpdate),
    /// The server rejected the credential. Terminal for the session.
    AuthError,
    /// The server does not know the task id. Terminal for the session.
    NotFound,
    /// The server closed the channel normally without a rejection.
    ClosedNormally,
    /// Transient transport failure; the next tick retries.
    Transport(String),
}

/// Build the status channel URI for a task.
///
/// Credential and locale travel as query parameters because the transport
/// does not support custom headers. `http`/`https` bases are rewritten to
/// their WebSocket schemes.
pub fn status_url(endpoint: &str, task_id: TaskId, credential: &str, locale: &str) -> String {
    let base = endpoint.trim_end_matches('/');
    let base = if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else {
        base.to_string()
    };
    format!("{base}/ws/status/{task_id}?token={credential}&locale={locale}")
}

/// A single open status connection.
pub struct StatusConnection {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    task_id: TaskId,
}

impl StatusConnection {
    /// Open the status channel for a task.
    ///
    /// A connect failure is transient from the session's point of view;
    /// the caller maps it to [`ConnectionOutcome::Transport`].
    pub async fn open(url: &str, task_id: TaskId) -> Result<Self, tungstenite::Error> {
        let (ws, _response) = connect_async(url).await?;
        debug!(task_id = %task_id, "status connection established");
        Ok(Self { ws, task_id })
    }

    /// Read frames until the connection settles, sending each outcome as it
    /// happens. Status snapshots are delivered immediately, never buffered;
    /// undecodable frames are skipped without tearing the connection down.
    /// Exactly one closure outcome is sent last. Dropping the future closes
    /// the underlying socket, so abandoning an attempt is always safe.
    pub async fn drive(mut self, outcomes: mpsc::UnboundedSender<ConnectionOutcome>) {
        while let Some(item) = self.ws.next().await {
            match item {
                Ok(Message::Text(text)) => {
                    let payload: serde_json::Value = match serde_json::from_str(&text) {
                        Ok(payload) => payload,
                        Err(err) => {
                            debug!(task_id = %self.task_id, %err, "discarding undecodable frame");
                            continue;
                        }
                    };
                    match interpret(&payload) {
                        Some(update) => {
                            if outcomes.send(ConnectionOutcome::Update(update)).is_err() {
                                return;
                            }
                        }
                        None => {
                            debug!(task_id = %self.task_id, "ignoring frame without status payload");
                        }
                    }
                }
                Ok(Message::Close(frame)) => {
                    let _ = outcomes.send(classify_close(frame));
                    return;
                }
                // Ping/pong are handled by the protocol layer; binary frames
                // are not part of the status contract.
                Ok(_) => {}
                Err(err) => {
                    let _ = outcomes.send(ConnectionOutcome::Transport(err.to_string()));
                    return;
                }
            }
        }
        let _ = outcomes.send(ConnectionOutcome::Transport(
            "connection ended without close frame".to_string(),
        ));
    }
}

/// Classify how the server closed the channel.
fn classify_close(frame: Option<CloseFrame<'_>>) -> ConnectionOutcome {
    let Some(frame) = frame else {
        return ConnectionOutcome::Transport("connection closed without close frame".to_string());
    };
    match frame.code {
        CloseCode::Normal => ConnectionOutcome::ClosedNormally,
        // 1003 carries the rejection reason in its text.
        CloseCode::Unsupported => {
            if frame.reason.contains(AUTH_FAILED_MARKER) {
                ConnectionOutcome::AuthError
            } else if frame.reason.contains(TASK_NOT_FOUND_MARKER) {
                ConnectionOutcome::NotFound
            } else {
                ConnectionOutcome::Transport(format!("close code 1003: {}", frame.reason))
            }
        }
        code => ConnectionOutcome::Transport(format!(
            "close code {}: {}",
            u16::from(code),
            frame.reason
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genwatch_core::TaskStatus;

    fn close_frame(code: CloseCode, reason: &'static str) -> Option<CloseFrame<'static>> {
        Some(CloseFrame {
            code,
            reason: reason.into(),
        })
    }

    #[test]
    fn test_status_url_shape() {
        let url = status_url("http://host:4200/research_chat/", TaskId::new(42), "tok", "cn");
        assert_eq!(url, "ws://host:4200/research_chat/ws/status/42?token=tok&locale=cn");
    }

    #[test]
    fn test_status_url_https_becomes_wss() {
        let url = status_url("https://host/research_chat", TaskId::new(7), "tok", "en");
        assert!(url.starts_with("wss://host/"));
    }

    #[test]
    fn test_classify_auth_failure() {
        let outcome = classify_close(close_frame(
            CloseCode::Unsupported,
            "Authentication failed (403 equivalent)",
        ));
        assert_eq!(outcome, ConnectionOutcome::AuthError);
    }

    #[test]
    fn test_classify_task_not_found() {
        let outcome = classify_close(close_frame(
            CloseCode::Unsupported,
            "Task not found (404 equivalent)",
        ));
        assert_eq!(outcome, ConnectionOutcome::NotFound);
    }

    #[test]
    fn test_classify_normal_close() {
        let outcome = classify_close(close_frame(CloseCode::Normal, ""));
        assert_eq!(outcome, ConnectionOutcome::ClosedNormally);
    }

    #[test]
    fn test_classify_unknown_1003_reason_is_transport() {
        let outcome = classify_close(close_frame(CloseCode::Unsupported, "some other reason"));
        assert!(matches!(outcome, ConnectionOutcome::Transport(_)));
    }

    #[test]
    fn test_classify_other_codes_are_transport() {
        let outcome = classify_close(close_frame(CloseCode::Error, "server hiccup"));
        assert!(matches!(outcome, ConnectionOutcome::Transport(_)));
        let outcome = classify_close(None);
        assert!(matches!(outcome, ConnectionOutcome::Transport(_)));
    }

    #[test]
    fn test_update_outcome_carries_snapshot() {
        let update = StatusUpdate::new(TaskStatus::Creating, vec!["step1".to_string()]);
        let outcome = ConnectionOutcome::Update(update.clone());
        assert_eq!(outcome, ConnectionOutcome::Update(update));
    }
}
