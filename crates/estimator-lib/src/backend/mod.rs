//! Time-series backend access
//!
//! The estimator needs exactly two read operations from its backend:
//! listing the metric definitions matching a tag filter, and reading the
//! datapoints of one definition within a time window. [`MetricsBackend`]
//! captures that seam; [`HawkularBackend`] implements it over HTTP.

mod hawkular;

pub use hawkular::HawkularBackend;

use crate::error::Result;
use crate::models::{Datapoint, MetricDefinition, SeriesType, TagFilter};
use chrono::{DateTime, Utc};

pub use async_trait::async_trait;

/// Read interface onto the time-series backend
#[async_trait]
pub trait MetricsBackend: Send + Sync {
    /// List all metric definitions whose tags match `filter`
    async fn definitions(&self, filter: &TagFilter) -> Result<Vec<MetricDefinition>>;

    /// Read datapoints of one series within `[start, end)`
    async fn datapoints(
        &self,
        series_type: SeriesType,
        id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Datapoint>>;
}
