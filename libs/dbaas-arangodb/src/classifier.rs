//! Classifier builders.
//!
//! A classifier identifies a logical database in the aggregator. The two
//! built-in strategies cover service-wide and per-tenant databases; any
//! `Fn(&RequestContext) -> Result<Classifier, DbaasError>` can be used as a
//! custom strategy.

use dbaas_sdk::{Classifier, RequestContext, classifier_keys};

use crate::DEFAULT_DB_ID;
use crate::config::ServiceIdentity;
use crate::error::DbaasError;

/// Strategy mapping a request context to a classifier.
pub trait ClassifierFn: Send + Sync {
    /// Build the classifier for the request.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` when the context lacks a value the strategy
    /// requires.
    fn classify(&self, ctx: &RequestContext) -> Result<Classifier, DbaasError>;
}

impl<F> ClassifierFn for F
where
    F: Fn(&RequestContext) -> Result<Classifier, DbaasError> + Send + Sync,
{
    fn classify(&self, ctx: &RequestContext) -> Result<Classifier, DbaasError> {
        self(ctx)
    }
}

/// Value of the `scope` classifier attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierScope {
    Service,
    Tenant,
}

impl ClassifierScope {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Service => "service",
            Self::Tenant => "tenant",
        }
    }
}

/// Classifier of a database shared by every tenant of the microservice.
#[derive(Debug, Clone)]
pub struct ServiceClassifier {
    identity: ServiceIdentity,
}

impl ServiceClassifier {
    #[must_use]
    pub fn new(identity: ServiceIdentity) -> Self {
        Self { identity }
    }
}

impl ClassifierFn for ServiceClassifier {
    fn classify(&self, ctx: &RequestContext) -> Result<Classifier, DbaasError> {
        Ok(base_classifier(&self.identity, ClassifierScope::Service)
            .with(classifier_keys::DB_ID, db_id(ctx)))
    }
}

/// Classifier of a database owned by the tenant of the request.
///
/// Fails with `Configuration` when the context carries no tenant: a tenant
/// database must never silently fall back to another scope.
#[derive(Debug, Clone)]
pub struct TenantClassifier {
    identity: ServiceIdentity,
}

impl TenantClassifier {
    #[must_use]
    pub fn new(identity: ServiceIdentity) -> Self {
        Self { identity }
    }
}

impl ClassifierFn for TenantClassifier {
    fn classify(&self, ctx: &RequestContext) -> Result<Classifier, DbaasError> {
        let Some(tenant_id) = ctx.tenant_id() else {
            tracing::error!(
                microservice = %self.identity.microservice_name,
                "tenant classifier requested without tenant in request context"
            );
            return Err(DbaasError::Configuration(
                "tenant database requested but request context has no tenant id".to_owned(),
            ));
        };

        Ok(base_classifier(&self.identity, ClassifierScope::Tenant)
            .with(classifier_keys::TENANT_ID, tenant_id)
            .with(classifier_keys::DB_ID, db_id(ctx)))
    }
}

fn base_classifier(identity: &ServiceIdentity, scope: ClassifierScope) -> Classifier {
    Classifier::new()
        .with(
            classifier_keys::MICROSERVICE_NAME,
            identity.microservice_name.as_str(),
        )
        .with(classifier_keys::NAMESPACE, identity.namespace.as_str())
        .with(classifier_keys::SCOPE, scope.as_str())
}

fn db_id(ctx: &RequestContext) -> &str {
    ctx.db_id().unwrap_or(DEFAULT_DB_ID)
}
