//! Database handle provider.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dbaas_sdk::{
    Classifier, ConnectionConfig, DriverClient, DriverDatabase, DriverError, DriverFactory,
    RequestContext, Transport,
};
use tokio::sync::Mutex;

use crate::DB_TYPE;
use crate::cache::{CacheKey, ClientCache};
use crate::cancellation::with_cancellation;
use crate::classifier::ClassifierFn;
use crate::config::HttpOptions;
use crate::error::DbaasError;
use crate::resolver::{ConnectionResolver, ResolveMode, ResolvedConnection};
use crate::tls;

/// Cache entry: a long-lived driver client bound to one logical database.
pub struct CachedArangoClient {
    client: Arc<dyn DriverClient>,
    db_name: String,
    /// Bumped after each credential swap.
    generation: AtomicU64,
    auth_lock: Mutex<()>,
}

impl CachedArangoClient {
    #[must_use]
    pub fn new(client: Arc<dyn DriverClient>, db_name: impl Into<String>) -> Self {
        Self {
            client,
            db_name: db_name.into(),
            generation: AtomicU64::new(0),
            auth_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn db_name(&self) -> &str {
        &self.db_name
    }

    /// Number of credential refreshes applied to this client.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

impl fmt::Debug for CachedArangoClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedArangoClient")
            .field("db_name", &self.db_name)
            .field("generation", &self.generation())
            .finish_non_exhaustive()
    }
}

/// Hands out ArangoDB database handles for one classifier strategy.
///
/// Cheap to clone; every clone shares the client cache of the
/// [`DbaasArangoDbClient`](crate::DbaasArangoDbClient) it came from.
#[derive(Clone)]
pub struct ArangoDbClient {
    http: HttpOptions,
    tls_port: u16,
    resolver: ConnectionResolver,
    driver: Arc<dyn DriverFactory>,
    classifier: Arc<dyn ClassifierFn>,
    cache: Arc<ClientCache<CachedArangoClient>>,
}

impl ArangoDbClient {
    #[must_use]
    pub fn new(
        http: HttpOptions,
        tls_port: u16,
        resolver: ConnectionResolver,
        driver: Arc<dyn DriverFactory>,
        classifier: Arc<dyn ClassifierFn>,
        cache: Arc<ClientCache<CachedArangoClient>>,
    ) -> Self {
        Self {
            http,
            tls_port,
            resolver,
            driver,
            classifier,
            cache,
        }
    }

    /// Get a live handle to the database selected by `db_id`.
    ///
    /// The driver client is built on first use and cached by classifier.
    /// Rejected credentials are refreshed from the aggregator once, then the
    /// database is opened again.
    ///
    /// # Errors
    ///
    /// - `Configuration` if the classifier cannot be built from `ctx`
    /// - `Provisioning` / `NotFound` / `Translation` from the aggregator
    /// - `Unavailable` if the cluster has no leader or cannot be reached (not retried)
    /// - `Authentication` if refreshed credentials are rejected too
    /// - `Cancelled` if `ctx` is cancelled
    #[tracing::instrument(skip_all, fields(db_type = DB_TYPE, db_id = %db_id))]
    pub async fn get_arango_database(
        &self,
        ctx: &RequestContext,
        db_id: &str,
    ) -> Result<Arc<dyn DriverDatabase>, DbaasError> {
        let ctx = ctx.with_db_id(db_id);
        let classifier = self.classifier.classify(&ctx)?;
        let key = CacheKey::new(DB_TYPE, &classifier);

        let entry = self
            .cache
            .get_or_build(&key, || self.create_client(&ctx, &classifier))
            .await?;
        let generation = entry.generation();

        match with_cancellation(&ctx, entry.client.database(&entry.db_name)).await? {
            Ok(db) => Ok(db),
            Err(DriverError::Unauthorized(msg)) => {
                tracing::info!(error = %msg, "trying to get new password due to authentication error");
                self.update_authentication(&ctx, &entry, &classifier, generation)
                    .await?;
                with_cancellation(&ctx, entry.client.database(&entry.db_name))
                    .await?
                    .map_err(|e| {
                        tracing::error!(error = %e, "database still unavailable after credential refresh");
                        open_error(e)
                    })
            }
            Err(e) => {
                tracing::error!(error = %e, "can't connect to arango database");
                Err(open_error(e))
            }
        }
    }

    /// Cache shared with every other client of the same broker.
    #[must_use]
    pub fn cache(&self) -> &Arc<ClientCache<CachedArangoClient>> {
        &self.cache
    }

    async fn create_client(
        &self,
        ctx: &RequestContext,
        classifier: &Classifier,
    ) -> Result<CachedArangoClient, DbaasError> {
        tracing::debug!(%classifier, "creating arangodb client");

        let resolved = self
            .resolver
            .resolve(ctx, classifier, ResolveMode::CreateIfAbsent)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "failed to get database from dbaas"))?;

        let config = self.connection_config(&resolved).await?;
        let client = self.driver.new_client(config)?;
        Ok(CachedArangoClient::new(client, resolved.properties.db_name))
    }

    async fn update_authentication(
        &self,
        ctx: &RequestContext,
        entry: &CachedArangoClient,
        classifier: &Classifier,
        observed_generation: u64,
    ) -> Result<(), DbaasError> {
        let _guard = with_cancellation(ctx, entry.auth_lock.lock()).await?;

        // Another caller refreshed while we waited for the lock
        if entry.generation() != observed_generation {
            tracing::debug!("credentials already refreshed");
            return Ok(());
        }

        let resolved = self
            .resolver
            .resolve(ctx, classifier, ResolveMode::FindOnly)
            .await
            .inspect_err(|e| {
                tracing::error!(error = %e, "cannot get connection properties from dbaas");
            })?;

        entry
            .client
            .set_authentication(resolved.properties.basic_auth())
            .map_err(|e| {
                tracing::error!(error = %e, "cannot set authentication to connection");
                DbaasError::from(e)
            })?;

        entry.generation.fetch_add(1, Ordering::AcqRel);
        tracing::info!(db_name = %entry.db_name, "arangodb credentials refreshed");
        Ok(())
    }

    /// Driver configuration for a resolved logical database.
    ///
    /// TLS databases are always reached on the configured TLS port, whatever
    /// port the aggregator advertises.
    ///
    /// # Errors
    ///
    /// Returns `Tls` if TLS is required, no TLS config was supplied and the
    /// OS trust store is unusable.
    pub async fn connection_config(
        &self,
        resolved: &ResolvedConnection,
    ) -> Result<ConnectionConfig, DbaasError> {
        let props = &resolved.properties;

        let (endpoint, transport) = if props.is_tls() {
            tracing::info!(
                logical_db = resolved.logical_db_name.as_deref().unwrap_or(&props.db_name),
                "connection to arangodb will be secured"
            );
            let tls_config = if let Some(config) = &self.http.tls_config {
                Arc::clone(config)
            } else {
                tls::default_client_config().await?
            };
            (
                format!("https://{}:{}", props.host, self.tls_port),
                Transport::Tls(tls_config),
            )
        } else {
            (
                format!("http://{}:{}", props.host, props.port),
                Transport::Plain,
            )
        };

        Ok(ConnectionConfig {
            endpoints: vec![endpoint],
            transport,
            authentication: props.basic_auth(),
            connect_timeout: self.http.connect_timeout,
            request_timeout: self.http.request_timeout,
        })
    }
}

/// Failures to open a database on an existing client. A cluster that cannot
/// be reached is as unavailable as one without a leader.
fn open_error(e: DriverError) -> DbaasError {
    match e {
        DriverError::NoLeader(msg) | DriverError::Connection(msg) => DbaasError::Unavailable(msg),
        other => other.into(),
    }
}

impl fmt::Debug for ArangoDbClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArangoDbClient")
            .field("http", &self.http)
            .field("tls_port", &self.tls_port)
            .field("resolver", &self.resolver)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
