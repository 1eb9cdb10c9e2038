//! Pure decode step for inbound status frames.
//!
//! A status frame looks like:
//!
//! ```json
//! { "code": 200, "data": { "status": "creating", "logs": ["step1"] } }
//! ```
//!
//! Anything else is not a status update and is ignored by callers.

use crate::status::TaskStatus;
use crate::update::StatusUpdate;
use serde_json::Value;

/// Envelope code marking a successful status record.
pub const SUCCESS_CODE: i64 = 200;

/// Decode a frame payload into a [`StatusUpdate`].
///
/// Returns `None` when the record does not match the expected shape;
/// callers treat that as "ignore this frame". Missing `logs` defaults to
/// an empty tail, and non-string log entries are skipped.
pub fn interpret(payload: &Value) -> Option<StatusUpdate> {
    if payload.get("code").and_then(Value::as_i64) != Some(SUCCESS_CODE) {
        return None;
    }

    let data = payload.get("data")?.as_object()?;
    let status = TaskStatus::parse(data.get("status")?.as_str()?);

    let logs = data
        .get("logs")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Some(StatusUpdate::new(status, logs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_interpret_status_frame() {
        let frame = json!({
            "code": 200,
            "data": { "status": "creating", "logs": ["step1", "step2"] }
        });
        let update = interpret(&frame).unwrap();
        assert_eq!(update.status, TaskStatus::Creating);
        assert_eq!(update.logs, vec!["step1", "step2"]);
    }

    #[test]
    fn test_missing_logs_defaults_to_empty() {
        let frame = json!({ "code": 200, "data": { "status": "pending" } });
        let update = interpret(&frame).unwrap();
        assert_eq!(update.status, TaskStatus::Pending);
        assert!(update.logs.is_empty());
    }

    #[test]
    fn test_non_string_log_entries_are_skipped() {
        let frame = json!({
            "code": 200,
            "data": { "status": "creating", "logs": ["step1", 7, null] }
        });
        let update = interpret(&frame).unwrap();
        assert_eq!(update.logs, vec!["step1"]);
    }

    #[test]
    fn test_unknown_status_passes_through() {
        let frame = json!({ "code": 200, "data": { "status": "archived" } });
        let update = interpret(&frame).unwrap();
        assert_eq!(update.status, TaskStatus::Other("archived".to_string()));
    }

    #[test]
    fn test_non_success_code_is_ignored() {
        let frame = json!({ "code": 500, "data": { "status": "failed" } });
        assert!(interpret(&frame).is_none());
    }

    #[test]
    fn test_malformed_shapes_are_ignored() {
        assert!(interpret(&json!("not an object")).is_none());
        assert!(interpret(&json!({ "code": 200 })).is_none());
        assert!(interpret(&json!({ "code": 200, "data": "oops" })).is_none());
        assert!(interpret(&json!({ "code": 200, "data": { "logs": [] } })).is_none());
        assert!(interpret(&json!({ "code": 200, "data": { "status": 42 } })).is_none());
    }
}
