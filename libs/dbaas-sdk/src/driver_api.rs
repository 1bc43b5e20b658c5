//! Driver API traits for the database wire-protocol client.
//!
//! The broker constructs clients through [`DriverFactory`] and keeps them
//! for the lifetime of the process. Credentials are swapped in place with
//! [`DriverClient::set_authentication`] when the aggregator rotates them.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::error::DriverError;

/// Basic authentication credentials.
#[derive(Clone)]
pub struct BasicAuth {
    username: String,
    password: SecretString,
}

impl BasicAuth {
    #[must_use]
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Callers must not log or persist the returned value.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &self.password)
            .finish()
    }
}

/// Transport used to reach the database endpoints.
#[derive(Debug, Clone)]
pub enum Transport {
    Plain,
    Tls(Arc<rustls::ClientConfig>),
}

impl Transport {
    #[must_use]
    pub fn is_tls(&self) -> bool {
        matches!(self, Self::Tls(_))
    }
}

/// Everything a driver needs to open a client.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Endpoint URLs, used round-robin by the driver.
    pub endpoints: Vec<String>,
    pub transport: Transport,
    pub authentication: BasicAuth,
    pub connect_timeout: Option<Duration>,
    pub request_timeout: Option<Duration>,
}

/// A database handle returned by a driver client.
pub trait DriverDatabase: Send + Sync + fmt::Debug {
    /// Name of the database this handle points to.
    fn name(&self) -> &str;
}

/// A long-lived driver client.
///
/// Implementations must allow [`set_authentication`](Self::set_authentication)
/// to be called on a shared client; the new credentials apply to every
/// subsequent request made through it.
#[async_trait]
pub trait DriverClient: Send + Sync {
    /// Replace the credentials of this client in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver refuses the new credentials.
    fn set_authentication(&self, auth: BasicAuth) -> Result<(), DriverError>;

    /// Open a handle to the named database.
    ///
    /// # Errors
    ///
    /// - `NoLeader` if the cluster is not available
    /// - `Unauthorized` if the current credentials are rejected
    async fn database(&self, name: &str) -> Result<Arc<dyn DriverDatabase>, DriverError>;
}

/// Constructs driver clients.
pub trait DriverFactory: Send + Sync {
    /// Create a new client from the connection configuration.
    ///
    /// # Errors
    ///
    /// Returns `Connection` if the configuration cannot be turned into a client.
    fn new_client(&self, config: ConnectionConfig) -> Result<Arc<dyn DriverClient>, DriverError>;
}
