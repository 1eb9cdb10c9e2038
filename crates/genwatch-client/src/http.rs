//! HTTP client for the collaborator service.
//!
//! The only call this subsystem consumes is task creation: it yields the
//! task id the poller is then pointed at. Session/message CRUD stays with
//! the collaborator.

use serde::{Deserialize, Serialize};
use tracing::debug;

use genwatch_core::{SessionId, TaskId, SUCCESS_CODE};

use crate::error::ClientError;

/// HTTP client for the collaborator REST API.
pub struct ApiClient {
    inner: reqwest::Client,
    base_url: String,
    credential: String,
}

/// Identifiers returned by a successful task creation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedTask {
    /// Session the task belongs to (created on demand server-side).
    pub session_id: SessionId,
    /// Task id to feed into the poller.
    pub message_id: TaskId,
}

#[derive(Serialize)]
struct CreateTaskRequest<'a> {
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<&'a str>,
    locale: &'a str,
}

#[derive(Deserialize)]
struct Envelope<T> {
    code: i64,
    #[serde(default)]
    message: Option<String>,
    data: Option<T>,
}

impl ApiClient {
    /// Create a new API client.
    pub fn new(base_url: &str, credential: &str) -> Self {
        Self {
            inner: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            credential: credential.to_string(),
        }
    }

    /// Submit a generation request and get back the identifiers the status
    /// channel is addressed by.
    pub async fn create_task(
        &self,
        content: &str,
        session_id: Option<&str>,
        locale: &str,
    ) -> Result<CreatedTask, ClientError> {
        if self.credential.trim().is_empty() {
            return Err(ClientError::CredentialMissing);
        }

        let url = format!("{}/api/create", self.base_url);
        debug!(url = %url, "creating generation task");

        let response = self
            .inner
            .post(&url)
            .bearer_auth(&self.credential)
            .json(&CreateTaskRequest {
                content,
                session_id,
                locale,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Api {
                code: i64::from(status.as_u16()),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let envelope: Envelope<CreatedTask> = response
            .json()
            .await
            .map_err(|e| ClientError::Serialization(e.to_string()))?;

        if envelope.code != SUCCESS_CODE {
            return Err(ClientError::Api {
                code: envelope.code,
                message: envelope.message.unwrap_or_default(),
            });
        }

        envelope.data.ok_or_else(|| {
            ClientError::Serialization("success envelope without data".to_string())
        })
    }
}
