//! Error types for the GenWatch client.

use thiserror::Error;

/// Errors that can occur when using the GenWatch client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No authentication credential available. Checked before any network
    /// activity; authentication is not self-healing within this client.
    #[error("no authentication credential available")]
    CredentialMissing,

    /// The configured endpoint is unusable.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// HTTP error from the collaborator service.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The collaborator service answered with a non-success envelope.
    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}
