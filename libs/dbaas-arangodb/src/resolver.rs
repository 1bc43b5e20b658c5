//! Resolution of a classifier into typed connection properties.

use std::sync::Arc;

use dbaas_sdk::{BaseDbParams, Classifier, ProvisioningClient, RequestContext};

use crate::DB_TYPE;
use crate::cancellation::with_cancellation;
use crate::conn_properties::ArangoConnProperties;
use crate::error::DbaasError;

/// How the aggregator is asked for the logical database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    /// Allocate the database when it does not exist yet.
    CreateIfAbsent,
    /// Look the database up; never allocates.
    FindOnly,
}

/// Outcome of a resolution.
#[derive(Debug, Clone)]
pub struct ResolvedConnection {
    pub properties: ArangoConnProperties,
    /// Logical database name, known only for [`ResolveMode::CreateIfAbsent`].
    pub logical_db_name: Option<String>,
}

/// Asks the aggregator for the connection properties of a classifier.
#[derive(Clone)]
pub struct ConnectionResolver {
    provisioning: Arc<dyn ProvisioningClient>,
    params: BaseDbParams,
}

impl ConnectionResolver {
    #[must_use]
    pub fn new(provisioning: Arc<dyn ProvisioningClient>, params: BaseDbParams) -> Self {
        Self {
            provisioning,
            params,
        }
    }

    /// Resolve the classifier.
    ///
    /// # Errors
    ///
    /// - `Provisioning` / `NotFound` from the aggregator
    /// - `Translation` if the returned properties are malformed
    /// - `Cancelled` if the request is cancelled while waiting
    pub async fn resolve(
        &self,
        ctx: &RequestContext,
        classifier: &Classifier,
        mode: ResolveMode,
    ) -> Result<ResolvedConnection, DbaasError> {
        let resolved = match mode {
            ResolveMode::CreateIfAbsent => {
                let db = with_cancellation(
                    ctx,
                    self.provisioning
                        .get_or_create_db(DB_TYPE, classifier, &self.params),
                )
                .await??;
                tracing::debug!(
                    db_type = DB_TYPE,
                    logical_db = %db.name,
                    %classifier,
                    "logical database resolved"
                );
                ResolvedConnection {
                    properties: ArangoConnProperties::try_from(&db.connection_properties)?,
                    logical_db_name: Some(db.name).filter(|name| !name.is_empty()),
                }
            }
            ResolveMode::FindOnly => {
                let props = with_cancellation(
                    ctx,
                    self.provisioning
                        .get_connection(DB_TYPE, classifier, &self.params),
                )
                .await??;
                ResolvedConnection {
                    properties: ArangoConnProperties::try_from(&props)?,
                    logical_db_name: None,
                }
            }
        };
        Ok(resolved)
    }
}

impl std::fmt::Debug for ConnectionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionResolver")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}
