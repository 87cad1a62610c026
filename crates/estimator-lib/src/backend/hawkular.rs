//! Hawkular-style HTTP backend
//!
//! Definitions are listed via `GET {base}/metrics?tags=...` and datapoints
//! read via `GET {base}/{type}/{id}/raw`. The tenant rides on every request
//! as the `Hawkular-Tenant` header, the bearer token (when one was
//! resolved) as `Authorization`. A `204 No Content` or empty body reads as
//! zero datapoints.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Certificate, Client, Identity, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::MetricsBackend;
use crate::config::ConnectionConfig;
use crate::error::{EstimatorError, Result};
use crate::models::{Datapoint, MetricDefinition, SeriesType, TagFilter};

/// Tenant header recognized by the backend
const TENANT_HEADER: &str = "Hawkular-Tenant";

/// Request timeout applied to every backend call
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client bound to one backend, tenant and credential set
pub struct HawkularBackend {
    client: Client,
    base_url: Url,
}

impl HawkularBackend {
    /// Build a backend client from resolved connection settings.
    pub fn new(config: &ConnectionConfig) -> Result<Self> {
        if config.base_url.cannot_be_a_base() {
            return Err(EstimatorError::ClientBuild(format!(
                "endpoint {} cannot carry request paths",
                config.base_url
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            TENANT_HEADER,
            HeaderValue::from_str(&config.tenant)
                .map_err(|e| EstimatorError::ClientBuild(format!("tenant header: {}", e)))?,
        );
        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| EstimatorError::ClientBuild(format!("authorization header: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .danger_accept_invalid_certs(config.tls.insecure_skip_verify);

        if let Some(ca) = &config.tls.ca_bundle_pem {
            let cert = Certificate::from_pem(ca)
                .map_err(|e| EstimatorError::ClientBuild(format!("ca bundle: {}", e)))?;
            builder = builder.add_root_certificate(cert);
        }
        if let Some(identity) = &config.tls.identity_pem {
            let identity = Identity::from_pem(identity)
                .map_err(|e| EstimatorError::ClientBuild(format!("client identity: {}", e)))?;
            builder = builder.identity(identity);
        }

        let client = builder
            .build()
            .map_err(|e| EstimatorError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Base URL with `segments` appended to its path
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                EstimatorError::ClientBuild(format!(
                    "endpoint {} cannot carry request paths",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl MetricsBackend for HawkularBackend {
    async fn definitions(&self, filter: &TagFilter) -> Result<Vec<MetricDefinition>> {
        let tags = filter
            .iter()
            .map(|(name, pattern)| format!("{}:{}", name, pattern))
            .collect::<Vec<_>>()
            .join(",");

        let mut url = self.endpoint(&["metrics"])?;
        url.query_pairs_mut().append_pair("tags", &tags);

        debug!(url = %url, "Listing metric definitions");

        let response = self.client.get(url).send().await?;
        let definitions: Option<Vec<MetricDefinition>> = read_json(response).await?;
        Ok(definitions.unwrap_or_default())
    }

    async fn datapoints(
        &self,
        series_type: SeriesType,
        id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Datapoint>> {
        let mut url = self.endpoint(&[series_type.path_segment(), id, "raw"])?;
        url.query_pairs_mut()
            .append_pair("start", &start.timestamp_millis().to_string())
            .append_pair("end", &end.timestamp_millis().to_string());

        debug!(url = %url, "Reading datapoints");

        let response = self.client.get(url).send().await?;
        let points: Option<Vec<Datapoint>> = read_json(response).await?;
        Ok(points.unwrap_or_default())
    }
}

/// Decode a JSON response body, treating 204 and empty bodies as absent.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<Option<T>> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(EstimatorError::BackendStatus {
            status: status.as_u16(),
            body,
        });
    }
    if status == StatusCode::NO_CONTENT {
        return Ok(None);
    }

    let body = response.text().await?;
    if body.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(&body)?))
}
