//! Broker entry point.

use std::sync::Arc;

use dbaas_sdk::{DriverFactory, ProvisioningClient};

use crate::arango_client::CachedArangoClient;
use crate::cache::ClientCache;
use crate::classifier::{ClassifierFn, ServiceClassifier, TenantClassifier};
use crate::config::DbaasConfig;
use crate::database::{ArangoDatabase, DbParams};
use crate::error::DbaasError;
use crate::resolver::ConnectionResolver;

/// Factory of [`ArangoDatabase`] objects.
///
/// Owns the client cache: every database and client derived from one
/// instance shares it, so create a single instance per process.
#[derive(Clone)]
pub struct DbaasArangoDbClient {
    provisioning: Arc<dyn ProvisioningClient>,
    driver: Arc<dyn DriverFactory>,
    config: DbaasConfig,
    cache: Arc<ClientCache<CachedArangoClient>>,
}

impl DbaasArangoDbClient {
    /// # Errors
    ///
    /// Returns `Configuration` if the service identity in `config` is
    /// incomplete.
    pub fn new(
        provisioning: Arc<dyn ProvisioningClient>,
        driver: Arc<dyn DriverFactory>,
        config: DbaasConfig,
    ) -> Result<Self, DbaasError> {
        config.validate()?;
        tracing::debug!(
            microservice = %config.microservice_name,
            namespace = %config.namespace,
            "dbaas arangodb client created"
        );
        Ok(Self {
            provisioning,
            driver,
            config,
            cache: Arc::new(ClientCache::new()),
        })
    }

    /// Database shared by every tenant of the service.
    #[must_use]
    pub fn service_database(&self, params: Option<DbParams>) -> ArangoDatabase {
        let default = || -> Arc<dyn ClassifierFn> {
            Arc::new(ServiceClassifier::new(self.config.identity()))
        };
        self.database(params.unwrap_or_default(), default)
    }

    /// Database of the tenant carried by each request.
    #[must_use]
    pub fn tenant_database(&self, params: Option<DbParams>) -> ArangoDatabase {
        let default = || -> Arc<dyn ClassifierFn> {
            Arc::new(TenantClassifier::new(self.config.identity()))
        };
        self.database(params.unwrap_or_default(), default)
    }

    #[must_use]
    pub fn config(&self) -> &DbaasConfig {
        &self.config
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<ClientCache<CachedArangoClient>> {
        &self.cache
    }

    fn database(
        &self,
        params: DbParams,
        default_classifier: impl FnOnce() -> Arc<dyn ClassifierFn>,
    ) -> ArangoDatabase {
        ArangoDatabase::new(
            params.classifier.unwrap_or_else(default_classifier),
            ConnectionResolver::new(Arc::clone(&self.provisioning), params.base_db_params),
            Arc::clone(&self.driver),
            Arc::clone(&self.cache),
            self.config.http.clone(),
            self.config.tls_port,
        )
    }
}

impl std::fmt::Debug for DbaasArangoDbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbaasArangoDbClient")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
