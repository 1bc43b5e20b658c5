//! Error taxonomy of the ArangoDB DBaaS client.

use dbaas_sdk::{DriverError, ProvisioningError};

/// Errors returned by every public operation of this crate.
#[derive(thiserror::Error, Debug)]
pub enum DbaasError {
    /// Static configuration or request context is unusable (e.g. a tenant
    /// classifier requested without a tenant). Never retried.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("dbaas provisioning failed: {0}")]
    Provisioning(String),

    #[error("logical database not found: {0}")]
    NotFound(String),

    /// Connection properties returned by the aggregator do not match the
    /// expected shape.
    #[error("invalid connection property '{field}': {reason}")]
    Translation { field: &'static str, reason: String },

    #[error("arangodb authentication failed: {0}")]
    Authentication(String),

    /// No leader or unreachable cluster.
    #[error("arangodb is unavailable: {0}")]
    Unavailable(String),

    #[error("request cancelled")]
    Cancelled,

    #[error("arangodb driver error: {0}")]
    Driver(String),

    #[error("tls configuration error: {0}")]
    Tls(String),
}

impl DbaasError {
    /// Whether repeating the whole operation later may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Provisioning(_) | Self::Unavailable(_) | Self::Cancelled
        )
    }
}

impl From<ProvisioningError> for DbaasError {
    fn from(e: ProvisioningError) -> Self {
        match e {
            ProvisioningError::NotFound { classifier } => Self::NotFound(classifier),
            ProvisioningError::Request(msg) => Self::Provisioning(msg),
            ProvisioningError::InvalidResponse(msg) => {
                Self::Provisioning(format!("invalid response: {msg}"))
            }
        }
    }
}

impl From<DriverError> for DbaasError {
    fn from(e: DriverError) -> Self {
        match e {
            DriverError::NoLeader(msg) => Self::Unavailable(msg),
            DriverError::Unauthorized(msg) => Self::Authentication(msg),
            DriverError::Connection(msg) | DriverError::Internal(msg) => Self::Driver(msg),
        }
    }
}

impl From<figment::Error> for DbaasError {
    fn from(e: figment::Error) -> Self {
        Self::Configuration(e.to_string())
    }
}
