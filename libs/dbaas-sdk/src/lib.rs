#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! DBaaS SDK
//!
//! This crate provides the contracts shared between the DBaaS connection
//! broker and its external collaborators:
//!
//! - [`ProvisioningClient`] - the aggregator capability that creates or
//!   locates logical databases
//! - [`DriverFactory`], [`DriverClient`], [`DriverDatabase`] - the database
//!   wire-protocol driver capability
//! - [`Classifier`], [`LogicalDb`], [`BaseDbParams`] - wire models
//! - [`RequestContext`] - request-scoped tenant, database id and cancellation
//! - [`ProvisioningError`], [`DriverError`] - collaborator error types
//!
//! ## Usage
//!
//! ```ignore
//! use dbaas_sdk::{Classifier, ProvisioningClient, RequestContext};
//!
//! let ctx = RequestContext::builder().tenant_id("123").build();
//! let db = provisioning
//!     .get_or_create_db("arangodb", &classifier, &BaseDbParams::default())
//!     .await?;
//! ```

pub mod api;
pub mod context;
pub mod driver_api;
pub mod error;
pub mod models;

// Re-export main types at crate root
pub use api::ProvisioningClient;
pub use context::{RequestContext, RequestContextBuilder};
pub use driver_api::{
    BasicAuth, ConnectionConfig, DriverClient, DriverDatabase, DriverFactory, Transport,
};
pub use error::{DriverError, ProvisioningError};
pub use models::{BaseDbParams, Classifier, ConnectionPropertiesMap, LogicalDb, classifier_keys};
