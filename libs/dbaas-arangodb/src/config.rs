//! Configuration for the ArangoDB DBaaS client.

use std::sync::Arc;
use std::time::Duration;

use figment::Figment;
use figment::providers::Env;
use serde::{Deserialize, Serialize};

use crate::ARANGODB_TLS_PORT;
use crate::error::DbaasError;

/// Client configuration.
///
/// Usually loaded from the `dbaas` section of the host configuration, or
/// from `DBAAS__*` environment variables:
///
/// ```text
/// DBAAS__MICROSERVICE_NAME=orders
/// DBAAS__NAMESPACE=prod
/// DBAAS__HTTP__REQUEST_TIMEOUT=30s
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DbaasConfig {
    /// Name of the microservice owning the databases.
    pub microservice_name: String,
    /// Namespace the microservice is deployed to.
    pub namespace: String,
    /// Port used for every TLS connection, whatever port the aggregator
    /// advertises.
    pub tls_port: u16,
    /// Default transport options for driver clients.
    pub http: HttpOptions,
}

impl Default for DbaasConfig {
    fn default() -> Self {
        Self {
            microservice_name: String::new(),
            namespace: String::new(),
            tls_port: ARANGODB_TLS_PORT,
            http: HttpOptions::default(),
        }
    }
}

impl DbaasConfig {
    /// Section of the host configuration read by [`from_figment`](Self::from_figment).
    pub const SECTION: &'static str = "dbaas";

    /// Environment variable prefix read by [`load`](Self::load).
    pub const ENV_PREFIX: &'static str = "DBAAS__";

    /// Extract the `dbaas` section of a host figment.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the section cannot be deserialized or the
    /// service identity is incomplete.
    pub fn from_figment(figment: &Figment) -> Result<Self, DbaasError> {
        let config: Self = figment.focus(Self::SECTION).extract()?;
        config.validated()
    }

    /// Load configuration from `DBAAS__*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if a variable has the wrong shape or the
    /// service identity is incomplete.
    pub fn load() -> Result<Self, DbaasError> {
        let config: Self = Figment::from(Env::prefixed(Self::ENV_PREFIX).split("__")).extract()?;
        config.validated()
    }

    /// Static identity used by the built-in classifiers.
    #[must_use]
    pub fn identity(&self) -> ServiceIdentity {
        ServiceIdentity {
            microservice_name: self.microservice_name.clone(),
            namespace: self.namespace.clone(),
        }
    }

    /// Check that the service identity is complete.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` naming the first missing field.
    pub fn validate(&self) -> Result<(), DbaasError> {
        if self.microservice_name.trim().is_empty() {
            return Err(DbaasError::Configuration(
                "microservice_name must be set".to_owned(),
            ));
        }
        if self.namespace.trim().is_empty() {
            return Err(DbaasError::Configuration("namespace must be set".to_owned()));
        }
        Ok(())
    }

    fn validated(self) -> Result<Self, DbaasError> {
        self.validate()?;
        Ok(self)
    }
}

/// Identity of the running microservice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceIdentity {
    pub microservice_name: String,
    pub namespace: String,
}

impl ServiceIdentity {
    #[must_use]
    pub fn new(microservice_name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            microservice_name: microservice_name.into(),
            namespace: namespace.into(),
        }
    }
}

/// Transport options applied to every driver client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpOptions {
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Option<Duration>,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Option<Duration>,
    /// TLS client configuration for secured databases. When unset, a config
    /// backed by the OS root certificates is used.
    #[serde(skip)]
    pub tls_config: Option<Arc<rustls::ClientConfig>>,
}
