//! Task status tracking client for GenWatch.
//!
//! The collaborator service creates a generation task and returns a task id;
//! this crate tracks that task to completion by repeatedly opening
//! short-lived WebSocket status connections until a terminal status is
//! observed. Each poll tick opens one connection, reads status snapshots,
//! and classifies how the connection closed; terminal statuses and
//! auth/not-found rejections stop the loop, everything else retries on the
//! next tick.

pub mod config;
pub mod connection;
pub mod error;
pub mod http;
pub mod observer;
pub mod poller;

pub use config::PollConfig;
pub use connection::ConnectionOutcome;
pub use error::ClientError;
pub use http::{ApiClient, CreatedTask};
pub use observer::TaskObserver;
pub use poller::{start_polling, PollHandle};
