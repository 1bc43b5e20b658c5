use tokio_util::sync::CancellationToken;

/// `RequestContext` carries the request-scoped values the broker needs:
/// the tenant on whose behalf the call is made, an optional database id
/// override, and the cancellation signal for outgoing network calls.
#[derive(Debug, Clone)]
pub struct RequestContext {
    tenant_id: Option<String>,
    db_id: Option<String>,
    cancellation: CancellationToken,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::background()
    }
}

impl RequestContext {
    /// Create a new `RequestContext` builder
    #[must_use]
    pub fn builder() -> RequestContextBuilder {
        RequestContextBuilder::default()
    }

    /// Create a context with no tenant, no database id override and a
    /// cancellation token that is never cancelled by anyone else
    #[must_use]
    pub fn background() -> Self {
        RequestContextBuilder::default().build()
    }

    /// Get the tenant ID associated with the request, if any
    #[must_use]
    pub fn tenant_id(&self) -> Option<&str> {
        self.tenant_id.as_deref()
    }

    /// Get the explicit database id override, if any
    #[must_use]
    pub fn db_id(&self) -> Option<&str> {
        self.db_id.as_deref()
    }

    /// Derive a context that selects the given database id.
    ///
    /// The derived context shares the cancellation token of `self`.
    #[must_use]
    pub fn with_db_id(&self, db_id: impl Into<String>) -> Self {
        Self {
            tenant_id: self.tenant_id.clone(),
            db_id: Some(db_id.into()),
            cancellation: self.cancellation.clone(),
        }
    }

    /// Token observed by every network call made on behalf of this request
    #[must_use]
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

#[derive(Default)]
pub struct RequestContextBuilder {
    tenant_id: Option<String>,
    db_id: Option<String>,
    cancellation: Option<CancellationToken>,
}

impl RequestContextBuilder {
    #[must_use]
    pub fn tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    #[must_use]
    pub fn db_id(mut self, db_id: impl Into<String>) -> Self {
        self.db_id = Some(db_id.into());
        self
    }

    #[must_use]
    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    #[must_use]
    pub fn build(self) -> RequestContext {
        RequestContext {
            tenant_id: self.tenant_id.filter(|id| !id.is_empty()),
            db_id: self.db_id,
            cancellation: self.cancellation.unwrap_or_default(),
        }
    }
}
