//! Historical usage estimation for container workloads
//!
//! This crate provides the core functionality for:
//! - Building tag filters that select usage series by image and resource kind
//! - Querying a time-series backend for matching metric definitions
//! - Merging datapoints across series into percentile-based usage estimates
//! - Resolving backend connection settings (tenant, credentials, TLS)
//!
//! The sole consumer-facing operation is [`UsageSource::get_usage_percentile`],
//! which admission-time callers use to default resource requests for
//! workloads that do not declare their own.

pub mod auth;
pub mod backend;
pub mod config;
pub mod error;
pub mod models;
pub mod percentile;
pub mod source;
pub mod tags;

pub use auth::TlsSettings;
pub use backend::{HawkularBackend, MetricsBackend};
pub use config::{ConnectionConfig, DEFAULT_TENANT};
pub use error::{EstimatorError, Result};
pub use models::*;
pub use source::UsageSource;
