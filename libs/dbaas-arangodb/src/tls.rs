//! TLS client configuration for secured ArangoDB endpoints.
//!
//! OS root certificates are loaded once per process; the resulting rustls
//! config is shared by every TLS driver client that does not bring its own.

use std::sync::{Arc, OnceLock};

use rustls_pki_types::CertificateDer;

use crate::error::DbaasError;

static NATIVE_ROOTS: OnceLock<Vec<CertificateDer<'static>>> = OnceLock::new();
static DEFAULT_CLIENT_CONFIG: OnceLock<Arc<rustls::ClientConfig>> = OnceLock::new();

fn load_native_roots() -> Vec<CertificateDer<'static>> {
    let result = rustls_native_certs::load_native_certs();

    for err in &result.errors {
        tracing::warn!(error = %err, "error loading native root certificate");
    }

    if result.certs.is_empty() {
        tracing::warn!("no native root CA certificates found");
    } else {
        tracing::debug!(count = result.certs.len(), "loaded native root certificates");
    }

    result.certs
}

/// OS root certificates, loaded on first use. May be empty.
#[must_use]
pub fn native_root_certs() -> &'static [CertificateDer<'static>] {
    NATIVE_ROOTS.get_or_init(load_native_roots).as_slice()
}

/// Crypto provider: the process default when installed, aws-lc-rs otherwise.
/// Never installs a process-wide default.
#[must_use]
pub fn crypto_provider() -> Arc<rustls::crypto::CryptoProvider> {
    rustls::crypto::CryptoProvider::get_default()
        .cloned()
        .unwrap_or_else(|| Arc::new(rustls::crypto::aws_lc_rs::default_provider()))
}

/// Build a client config trusting `certs`.
///
/// # Errors
///
/// Returns `Tls` when none of the certificates parse or the provider
/// rejects the default protocol versions.
pub fn client_config_with_roots(
    certs: &[CertificateDer<'static>],
) -> Result<rustls::ClientConfig, DbaasError> {
    if certs.is_empty() {
        return Err(DbaasError::Tls(
            "no root CA certificates available".to_owned(),
        ));
    }

    let mut roots = rustls::RootCertStore::empty();
    let (added, ignored) = roots.add_parsable_certificates(certs.iter().cloned());
    if ignored > 0 {
        tracing::warn!(added, ignored, "some root certificates could not be parsed");
    }
    if added == 0 {
        return Err(DbaasError::Tls(format!(
            "none of the {} root CA certificates could be parsed",
            certs.len()
        )));
    }

    let config = rustls::ClientConfig::builder_with_provider(crypto_provider())
        .with_safe_default_protocol_versions()
        .map_err(|e| DbaasError::Tls(format!("failed to set TLS protocol versions: {e}")))?
        .with_root_certificates(roots)
        .with_no_client_auth();

    Ok(config)
}

/// Shared client config backed by the OS root certificates.
///
/// The trust store is read on the blocking pool; only a successful build is
/// kept.
///
/// # Errors
///
/// Returns `Tls` if the OS trust store yields no usable certificate.
pub async fn default_client_config() -> Result<Arc<rustls::ClientConfig>, DbaasError> {
    if let Some(config) = DEFAULT_CLIENT_CONFIG.get() {
        return Ok(Arc::clone(config));
    }

    let config = tokio::task::spawn_blocking(|| client_config_with_roots(native_root_certs()))
        .await
        .map_err(|e| DbaasError::Tls(format!("root certificate loading failed: {e}")))??;
    Ok(Arc::clone(
        DEFAULT_CLIENT_CONFIG.get_or_init(|| Arc::new(config)),
    ))
}
