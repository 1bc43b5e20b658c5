//! Error types reported by the external collaborators.

use thiserror::Error;

/// Errors that can occur when calling the DBaaS aggregator.
#[derive(Debug, Error)]
pub enum ProvisioningError {
    /// No logical database matches the classifier (lookup-only calls).
    #[error("logical database not found for classifier {classifier}")]
    NotFound {
        /// Classifier that was looked up, rendered for diagnostics.
        classifier: String,
    },

    /// The request could not be completed (network failure, non-2xx status).
    #[error("dbaas request failed: {0}")]
    Request(String),

    /// The aggregator answered with a body that could not be understood.
    #[error("invalid dbaas response: {0}")]
    InvalidResponse(String),
}

/// Errors reported by the database driver.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The cluster has no leader or cannot be reached.
    #[error("no leader: {0}")]
    NoLeader(String),

    /// The server rejected the supplied credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The client could not be constructed or the connection failed.
    #[error("connection error: {0}")]
    Connection(String),

    /// Any other driver failure.
    #[error("driver error: {0}")]
    Internal(String),
}
