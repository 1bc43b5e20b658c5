//! Provisioning API trait of the DBaaS aggregator.
//!
//! The broker only ever talks to the aggregator through this trait; the
//! HTTP transport behind it is supplied by the host service.

use async_trait::async_trait;

use crate::error::ProvisioningError;
use crate::models::{BaseDbParams, Classifier, ConnectionPropertiesMap, LogicalDb};

/// Aggregator capability that allocates or locates logical databases.
///
/// ```ignore
/// let db = provisioning
///     .get_or_create_db("arangodb", &classifier, &BaseDbParams::default())
///     .await?;
///
/// // Lookup only, never allocates
/// let props = provisioning
///     .get_connection("arangodb", &classifier, &BaseDbParams::default())
///     .await?;
/// ```
#[async_trait]
pub trait ProvisioningClient: Send + Sync {
    /// Get the logical database matching the classifier, creating it when
    /// it does not exist yet.
    ///
    /// # Errors
    ///
    /// - `Request` if the aggregator cannot be reached or answers non-2xx
    /// - `InvalidResponse` if the response body is malformed
    ///
    /// # Arguments
    ///
    /// * `db_type` - Database type tag (e.g. `arangodb`)
    /// * `classifier` - Identity of the logical database
    /// * `params` - Creation parameters, forwarded as-is
    async fn get_or_create_db(
        &self,
        db_type: &str,
        classifier: &Classifier,
        params: &BaseDbParams,
    ) -> Result<LogicalDb, ProvisioningError>;

    /// Get the current connection properties of an existing logical database.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no logical database matches the classifier
    /// - `Request` / `InvalidResponse` as for [`get_or_create_db`](Self::get_or_create_db)
    async fn get_connection(
        &self,
        db_type: &str,
        classifier: &Classifier,
        params: &BaseDbParams,
    ) -> Result<ConnectionPropertiesMap, ProvisioningError>;
}
