//! Status update value object.

use crate::status::TaskStatus;
use serde::{Deserialize, Serialize};

/// One status snapshot delivered over the status channel.
///
/// `logs` is the full log tail known as of this update, not a delta.
/// Consumers replace their displayed log list with the latest `logs`;
/// they never append across updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    /// Task status carried by this snapshot.
    pub status: TaskStatus,

    /// Full ordered log tail as of this snapshot.
    #[serde(default)]
    pub logs: Vec<String>,
}

impl StatusUpdate {
    /// Create a new StatusUpdate.
    pub fn new(status: TaskStatus, logs: Vec<String>) -> Self {
        Self { status, logs }
    }

    /// The most recent log line, if any.
    pub fn latest_log(&self) -> Option<&str> {
        self.logs.last().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_log() {
        let update = StatusUpdate::new(
            TaskStatus::Creating,
            vec!["step1".to_string(), "step2".to_string()],
        );
        assert_eq!(update.latest_log(), Some("step2"));

        let empty = StatusUpdate::new(TaskStatus::Pending, Vec::new());
        assert_eq!(empty.latest_log(), None);
    }
}
