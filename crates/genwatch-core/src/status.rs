//! Status enum for generation tasks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a generation task as reported by the status channel.
///
/// Serialized as the lowercase wire strings (`"pending"`, `"creating"`,
/// `"created"`, `"failed"`). Unrecognized strings round-trip through
/// [`TaskStatus::Other`] unchanged so that new server-side states do not
/// break older clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    /// Task queued but not yet started.
    #[default]
    Pending,
    /// Task actively generating.
    Creating,
    /// Task completed successfully.
    Created,
    /// Task failed.
    Failed,
    /// Status string this client does not know about.
    Other(String),
}

impl TaskStatus {
    /// Parse a wire status string.
    pub fn parse(s: &str) -> Self {
        match s {
            "pending" => Self::Pending,
            "creating" => Self::Creating,
            "created" => Self::Created,
            "failed" => Self::Failed,
            other => Self::Other(other.to_string()),
        }
    }

    /// The wire representation of this status.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Creating => "creating",
            Self::Created => "created",
            Self::Failed => "failed",
            Self::Other(s) => s,
        }
    }

    /// Returns true if the task has finished, successfully or not.
    ///
    /// This is the single terminality predicate; the polling loop stops
    /// exactly when it returns true.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Created | Self::Failed)
    }

    /// Returns true for the known in-progress states.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::Pending | Self::Creating)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for TaskStatus {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        status.as_str().to_string()
    }
}
