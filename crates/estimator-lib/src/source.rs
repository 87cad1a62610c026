//! Usage source: query orchestration over the backend
//!
//! One call builds the tag filter, discovers the matching metric
//! definitions, fans the per-definition datapoint reads out concurrently,
//! and aggregates the merged samples into a percentile estimate. A failure
//! anywhere aborts the whole call; partial results are never returned.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::debug;

use crate::backend::{HawkularBackend, MetricsBackend};
use crate::config::ConnectionConfig;
use crate::error::{EstimatorError, Result};
use crate::models::{Datapoint, ResourceKind, UsageEstimate};
use crate::percentile::compute_percentile;
use crate::tags::build_tag_filter;

/// Historical usage estimator bound to one backend connection
///
/// Holds no cross-call state beyond the read-only backend handle, so one
/// source can serve concurrent calls.
pub struct UsageSource {
    backend: Arc<dyn MetricsBackend>,
    use_namespace: bool,
}

impl UsageSource {
    /// Construct a source over any backend implementation
    pub fn new(backend: Arc<dyn MetricsBackend>, use_namespace: bool) -> Self {
        Self {
            backend,
            use_namespace,
        }
    }

    /// Resolve `endpoint_uri` and construct a source over the HTTP backend
    pub fn from_uri(endpoint_uri: &str) -> Result<Self> {
        let config = ConnectionConfig::from_uri(endpoint_uri)?;
        let backend = HawkularBackend::new(&config)?;
        Ok(Self::new(Arc::new(backend), config.use_namespace))
    }

    /// Whether namespace scoping was requested at configuration time
    pub fn use_namespace(&self) -> bool {
        self.use_namespace
    }

    /// Estimate usage of containers running `image` at percentile `rank`
    /// over `[start, end)`.
    ///
    /// Every call re-queries the backend; nothing is cached. The first
    /// failing read cancels the remaining reads and surfaces its error.
    pub async fn get_usage_percentile(
        &self,
        kind: ResourceKind,
        rank: i64,
        image: &str,
        namespace: &str,
        exact_match: bool,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<UsageEstimate> {
        if start > end {
            return Err(EstimatorError::InvalidWindow);
        }

        let filter = build_tag_filter(kind, image, exact_match);
        debug!(?kind, image, namespace, exact_match, "Querying usage history");

        let definitions = self.backend.definitions(&filter).await?;
        debug!(series = definitions.len(), "Matched metric definitions");

        let mut reads = JoinSet::new();
        for definition in definitions {
            let backend = Arc::clone(&self.backend);
            reads.spawn(async move {
                backend
                    .datapoints(definition.series_type, &definition.id, start, end)
                    .await
            });
        }

        let mut datapoints: Vec<Datapoint> = Vec::new();
        while let Some(joined) = reads.join_next().await {
            match joined {
                Ok(Ok(points)) => datapoints.extend(points),
                Ok(Err(e)) => {
                    reads.abort_all();
                    return Err(e);
                }
                Err(e) => {
                    reads.abort_all();
                    return Err(EstimatorError::TaskJoin(e.to_string()));
                }
            }
        }

        compute_percentile(&datapoints, rank)
    }
}
