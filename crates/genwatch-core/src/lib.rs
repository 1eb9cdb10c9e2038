//! GenWatch Core Domain Types
//!
//! This crate contains pure domain types with no dependencies on:
//! - Network/WebSocket
//! - Runtime specifics
//!
//! All types here represent the core business domain of GenWatch:
//! tracking the status of a server-side generation task.

pub mod ids;
pub mod interpret;
pub mod status;
pub mod update;

// Re-export commonly used types
pub use ids::{SessionId, TaskId};
pub use interpret::{interpret, SUCCESS_CODE};
pub use status::TaskStatus;
pub use update::StatusUpdate;
