//! Logical database entry point.

use std::fmt;
use std::sync::Arc;

use dbaas_sdk::{BaseDbParams, Classifier, DriverFactory, RequestContext};

use crate::arango_client::{ArangoDbClient, CachedArangoClient};
use crate::cache::ClientCache;
use crate::classifier::ClassifierFn;
use crate::config::HttpOptions;
use crate::conn_properties::ArangoConnProperties;
use crate::error::DbaasError;
use crate::resolver::{ConnectionResolver, ResolveMode};

/// Per-database parameters.
///
/// ```ignore
/// let params = DbParams::new()
///     .with_classifier(|ctx: &RequestContext| {
///         Ok(Classifier::new()
///             .with("scope", "service")
///             .with("microserviceName", "orders"))
///     })
///     .with_base_db_params(BaseDbParams {
///         name_prefix: Some("orders".to_owned()),
///         ..BaseDbParams::default()
///     });
/// let db = dbaas.service_database(Some(params));
/// ```
#[derive(Clone, Default)]
pub struct DbParams {
    /// Classifier strategy; the scope default of the entry point when unset.
    pub classifier: Option<Arc<dyn ClassifierFn>>,
    pub base_db_params: BaseDbParams,
}

impl DbParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_classifier(mut self, classifier: impl ClassifierFn + 'static) -> Self {
        self.classifier = Some(Arc::new(classifier));
        self
    }

    #[must_use]
    pub fn with_base_db_params(mut self, params: BaseDbParams) -> Self {
        self.base_db_params = params;
        self
    }
}

impl fmt::Debug for DbParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbParams")
            .field("custom_classifier", &self.classifier.is_some())
            .field("base_db_params", &self.base_db_params)
            .finish()
    }
}

/// A logical ArangoDB database of the service or of the current tenant.
#[derive(Clone)]
pub struct ArangoDatabase {
    classifier: Arc<dyn ClassifierFn>,
    resolver: ConnectionResolver,
    driver: Arc<dyn DriverFactory>,
    cache: Arc<ClientCache<CachedArangoClient>>,
    http: HttpOptions,
    tls_port: u16,
}

impl ArangoDatabase {
    #[must_use]
    pub fn new(
        classifier: Arc<dyn ClassifierFn>,
        resolver: ConnectionResolver,
        driver: Arc<dyn DriverFactory>,
        cache: Arc<ClientCache<CachedArangoClient>>,
        http: HttpOptions,
        tls_port: u16,
    ) -> Self {
        Self {
            classifier,
            resolver,
            driver,
            cache,
            http,
            tls_port,
        }
    }

    /// Client handing out database handles; `http` overrides the configured
    /// transport options.
    #[must_use]
    pub fn arango_db_client(&self, http: Option<HttpOptions>) -> ArangoDbClient {
        ArangoDbClient::new(
            http.unwrap_or_else(|| self.http.clone()),
            self.tls_port,
            self.resolver.clone(),
            Arc::clone(&self.driver),
            Arc::clone(&self.classifier),
            Arc::clone(&self.cache),
        )
    }

    /// Classifier of this database for the request.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the strategy cannot classify `ctx`.
    pub fn classifier(&self, ctx: &RequestContext) -> Result<Classifier, DbaasError> {
        self.classifier.classify(ctx)
    }

    /// Connection properties, creating the logical database if needed.
    ///
    /// # Errors
    ///
    /// Returns `Configuration`, `Provisioning`, `Translation` or `Cancelled`.
    #[tracing::instrument(skip_all)]
    pub async fn get_connection_properties(
        &self,
        ctx: &RequestContext,
    ) -> Result<ArangoConnProperties, DbaasError> {
        let classifier = self.classifier(ctx)?;
        let resolved = self
            .resolver
            .resolve(ctx, &classifier, ResolveMode::CreateIfAbsent)
            .await
            .inspect_err(|e| {
                tracing::error!(error = %e, "error acquiring connection properties from dbaas");
            })?;
        Ok(resolved.properties)
    }

    /// Connection properties of an existing logical database.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the database does not exist, otherwise as for
    /// [`get_connection_properties`](Self::get_connection_properties).
    #[tracing::instrument(skip_all)]
    pub async fn find_connection_properties(
        &self,
        ctx: &RequestContext,
    ) -> Result<ArangoConnProperties, DbaasError> {
        let classifier = self.classifier(ctx)?;
        let resolved = self
            .resolver
            .resolve(ctx, &classifier, ResolveMode::FindOnly)
            .await
            .inspect_err(|e| {
                tracing::error!(error = %e, "error finding connection properties from dbaas");
            })?;
        tracing::info!(%classifier, "found connection to arango db");
        Ok(resolved.properties)
    }

    /// [`get_connection_properties`](Self::get_connection_properties) for the
    /// database selected by `db_id`.
    ///
    /// # Errors
    ///
    /// As for [`get_connection_properties`](Self::get_connection_properties).
    pub async fn get_connection_properties_with_db_id(
        &self,
        ctx: &RequestContext,
        db_id: &str,
    ) -> Result<ArangoConnProperties, DbaasError> {
        self.get_connection_properties(&ctx.with_db_id(db_id)).await
    }

    /// [`find_connection_properties`](Self::find_connection_properties) for the
    /// database selected by `db_id`.
    ///
    /// # Errors
    ///
    /// As for [`find_connection_properties`](Self::find_connection_properties).
    pub async fn find_connection_properties_with_db_id(
        &self,
        ctx: &RequestContext,
        db_id: &str,
    ) -> Result<ArangoConnProperties, DbaasError> {
        self.find_connection_properties(&ctx.with_db_id(db_id)).await
    }
}

impl fmt::Debug for ArangoDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArangoDatabase")
            .field("resolver", &self.resolver)
            .field("http", &self.http)
            .field("tls_port", &self.tls_port)
            .finish_non_exhaustive()
    }
}
