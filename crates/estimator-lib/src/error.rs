//! Error types for the usage estimator
//!
//! Configuration errors are fatal at construction time; backend and
//! empty-result errors surface per call. The one silent case is an
//! individual raw value that fails numeric conversion, which is dropped
//! inside the aggregator.

use thiserror::Error;

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, EstimatorError>;

/// Errors surfaced by connection configuration and usage queries
#[derive(Debug, Error)]
pub enum EstimatorError {
    /// The endpoint URI could not be parsed
    #[error("invalid endpoint uri: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    /// A recognized endpoint parameter had an unparsable value
    #[error("invalid value {value:?} for parameter {name:?}")]
    InvalidParameter { name: &'static str, value: String },

    /// Loading or deriving TLS settings from the auth file failed
    #[error("failed to load auth config from {path}: {message}")]
    AuthConfig { path: String, message: String },

    /// The HTTP client could not be built from the resolved settings
    #[error("failed to build backend client: {0}")]
    ClientBuild(String),

    /// A backend request failed at the transport level
    #[error("backend request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a non-success status
    #[error("backend returned {status}: {body}")]
    BackendStatus { status: u16, body: String },

    /// A backend response body could not be decoded
    #[error("failed to decode backend response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A spawned datapoint read could not be joined
    #[error("datapoint read task failed: {0}")]
    TaskJoin(String),

    /// Percentile rank outside (0, 100]
    #[error("percentile rank must be in (0, 100], got {0}")]
    InvalidPercentile(i64),

    /// The query window ends before it starts
    #[error("invalid time window: start is after end")]
    InvalidWindow,

    /// No usable samples for the requested window and filter
    #[error("no usage samples available")]
    EmptySamples,
}
