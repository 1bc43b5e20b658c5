use std::future::Future;

use dbaas_sdk::RequestContext;

use crate::error::DbaasError;

/// Race `fut` against the cancellation token of the request.
///
/// When the token fires first, `fut` is dropped before completion.
pub async fn with_cancellation<F>(ctx: &RequestContext, fut: F) -> Result<F::Output, DbaasError>
where
    F: Future,
{
    tokio::select! {
        biased;
        () = ctx.cancellation_token().cancelled() => Err(DbaasError::Cancelled),
        out = fut => Ok(out),
    }
}
