#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! DBaaS ArangoDB client
//!
//! Resolves a request to a live ArangoDB database handle through the DBaaS
//! aggregator:
//!
//! 1. a classifier is built from the request context (service or tenant
//!    scope, or a caller-supplied strategy)
//! 2. the classifier keys a process-wide client cache; on a miss the
//!    aggregator is asked to get-or-create the logical database and a driver
//!    client is built from its connection properties
//! 3. the driver opens the database; rejected credentials trigger one
//!    refresh from the aggregator and a single retry
//!
//! ## Usage
//!
//! ```ignore
//! use dbaas_arangodb::{DbaasArangoDbClient, DbaasConfig};
//! use dbaas_sdk::RequestContext;
//!
//! let dbaas = DbaasArangoDbClient::new(provisioning, driver, DbaasConfig::load()?)?;
//! let arango = dbaas.service_database(None).arango_db_client(None);
//!
//! let ctx = RequestContext::builder().tenant_id("123").build();
//! let db = arango.get_arango_database(&ctx, "orders").await?;
//! ```

pub mod arango_client;
pub mod cache;
mod cancellation;
pub mod classifier;
pub mod client;
pub mod config;
pub mod conn_properties;
pub mod database;
pub mod error;
pub mod resolver;
pub mod tls;

pub use arango_client::{ArangoDbClient, CachedArangoClient};
pub use cache::{CacheKey, ClientCache};
pub use classifier::{ClassifierFn, ClassifierScope, ServiceClassifier, TenantClassifier};
pub use client::DbaasArangoDbClient;
pub use config::{DbaasConfig, HttpOptions, ServiceIdentity};
pub use conn_properties::ArangoConnProperties;
pub use database::{ArangoDatabase, DbParams};
pub use error::DbaasError;
pub use resolver::{ConnectionResolver, ResolveMode, ResolvedConnection};

/// Database type tag sent to the aggregator.
pub const DB_TYPE: &str = "arangodb";

/// Classifier attribute selecting one of several databases of a service.
pub const DB_ID_KEY: &str = dbaas_sdk::classifier_keys::DB_ID;

/// Discriminator used when the request context does not name a database.
pub const DEFAULT_DB_ID: &str = "default";

/// Port of every TLS-secured ArangoDB endpoint.
pub const ARANGODB_TLS_PORT: u16 = 8530;
