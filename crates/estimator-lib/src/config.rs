//! Backend connection configuration
//!
//! Resolves an endpoint URI with recognized query parameters into the
//! immutable settings a usage source is constructed from: base URL, tenant,
//! optional bearer token and TLS material. Construction either fully
//! succeeds or fails; there is no partial or retried configuration.

use std::path::Path;
use tracing::{debug, info};
use url::Url;

use crate::auth::{tls_from_kubeconfig, TlsSettings};
use crate::error::{EstimatorError, Result};

/// Tenant the collector writes usage series under, used unless overridden
pub const DEFAULT_TENANT: &str = "heapster";

/// Well-known location of the in-cluster service account token
pub const DEFAULT_SERVICE_ACCOUNT_FILE: &str =
    "/var/run/secrets/kubernetes.io/serviceaccount/token";

/// Endpoint parameters consumed at configuration time, stripped from the
/// base URL before it is used for requests
const RECOGNIZED_PARAMETERS: &[&str] =
    &["tenant", "useNamespace", "useServiceAccount", "auth", "insecure"];

/// Immutable connection settings resolved from the endpoint URI
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub base_url: Url,
    pub tenant: String,
    pub token: Option<String>,
    pub tls: TlsSettings,
    /// Namespace-scoping switch, stored for interface compatibility only
    pub use_namespace: bool,
}

impl ConnectionConfig {
    /// Resolve connection settings from `endpoint_uri`.
    pub fn from_uri(endpoint_uri: &str) -> Result<Self> {
        Self::from_uri_with_token_path(endpoint_uri, Path::new(DEFAULT_SERVICE_ACCOUNT_FILE))
    }

    /// Resolve with a custom service account token path (for testing)
    pub fn from_uri_with_token_path(endpoint_uri: &str, token_path: &Path) -> Result<Self> {
        let url = Url::parse(endpoint_uri)?;
        let params: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let first = |name: &str| {
            params
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str())
        };

        let tenant = first("tenant")
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_TENANT.to_string());

        let use_namespace = first("useNamespace").and_then(parse_bool).unwrap_or(false);

        let token = resolve_token(first("useServiceAccount"), token_path);

        let mut tls = resolve_tls(first("auth"))?;

        if let Some(value) = first("insecure") {
            let insecure = parse_bool(value).ok_or_else(|| EstimatorError::InvalidParameter {
                name: "insecure",
                value: value.to_string(),
            })?;
            tls.insecure_skip_verify = insecure;
        }

        let mut base_url = url.clone();
        base_url.set_query(None);
        let passthrough: Vec<_> = params
            .iter()
            .filter(|(k, _)| !RECOGNIZED_PARAMETERS.contains(&k.as_str()))
            .collect();
        if !passthrough.is_empty() {
            base_url.query_pairs_mut().extend_pairs(passthrough);
        }

        info!(
            base_url = %base_url,
            tenant = %tenant,
            bearer_token = token.is_some(),
            insecure = tls.insecure_skip_verify,
            "Resolved backend connection settings"
        );

        Ok(Self {
            base_url,
            tenant,
            token,
            tls,
            use_namespace,
        })
    }
}

/// Boolean endpoint parameter values
fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Bearer token resolution: the service account token when requested and
/// readable, otherwise none.
fn resolve_token(use_service_account: Option<&str>, token_path: &Path) -> Option<String> {
    if !use_service_account.and_then(parse_bool).unwrap_or(false) {
        return None;
    }

    match std::fs::read_to_string(token_path) {
        Ok(contents) => Some(contents.trim().to_string()),
        Err(e) => {
            debug!(
                path = %token_path.display(),
                error = %e,
                "Service account token not readable, continuing without bearer token"
            );
            None
        }
    }
}

/// TLS resolution: the auth file when one is named, otherwise defaults.
fn resolve_tls(auth: Option<&str>) -> Result<TlsSettings> {
    if let Some(path) = auth {
        if !path.is_empty() {
            return tls_from_kubeconfig(Path::new(path));
        }
    }

    Ok(TlsSettings::default())
}
