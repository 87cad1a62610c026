//! Core data models for the usage estimator

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Resource kind an estimate is requested for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Cpu,
    Memory,
}

impl ResourceKind {
    /// Descriptor name under which the collector stores this kind's series
    pub fn descriptor_name(&self) -> &'static str {
        match self {
            ResourceKind::Cpu => "cpu/usage",
            ResourceKind::Memory => "memory/usage",
        }
    }
}

/// Series typing the backend assigns to a metric definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesType {
    Gauge,
    Counter,
    Availability,
}

impl SeriesType {
    /// URL path segment the backend serves this series type under
    pub fn path_segment(&self) -> &'static str {
        match self {
            SeriesType::Gauge => "gauges",
            SeriesType::Counter => "counters",
            SeriesType::Availability => "availability",
        }
    }
}

/// Tag constraints used to select which series to aggregate
///
/// Ordered so the wire encoding of a filter is deterministic.
pub type TagFilter = BTreeMap<String, String>;

/// Backend identity of one time series matching a tag filter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricDefinition {
    pub id: String,
    #[serde(rename = "type")]
    pub series_type: SeriesType,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// One sample of a series within the query window
///
/// The value stays a raw JSON value until aggregation so heterogeneous
/// numeric subtypes survive transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Datapoint {
    pub timestamp: i64,
    pub value: serde_json::Value,
}

/// Percentile-based usage estimate over the merged sample set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEstimate {
    /// Usage at the requested percentile, truncated toward zero
    pub value: i64,
    /// Number of samples the estimate was computed from
    pub samples: usize,
}
