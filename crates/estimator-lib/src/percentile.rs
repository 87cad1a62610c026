//! Percentile aggregation over merged datapoint samples
//!
//! Samples arrive as raw JSON values of heterogeneous numeric subtypes.
//! Values that do not convert to `f64` are dropped rather than failing the
//! whole computation; an entirely empty sample set is an explicit error.

use crate::error::{EstimatorError, Result};
use crate::models::{Datapoint, UsageEstimate};

/// Compute the usage estimate at `rank` over all datapoint values.
///
/// The converted samples are sorted ascending and the value at position
/// `ceil(count * rank / 100) - 1` is selected, truncated toward zero.
/// Permuting the input yields the same estimate.
pub fn compute_percentile(datapoints: &[Datapoint], rank: i64) -> Result<UsageEstimate> {
    if !(1..=100).contains(&rank) {
        return Err(EstimatorError::InvalidPercentile(rank));
    }

    let mut samples: Vec<f64> = datapoints.iter().filter_map(|d| d.value.as_f64()).collect();

    let count = samples.len();
    if count == 0 {
        return Err(EstimatorError::EmptySamples);
    }

    samples.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let index = (count as f64 * rank as f64 / 100.0).ceil() as usize - 1;
    let usage = samples[index];

    Ok(UsageEstimate {
        value: usage as i64,
        samples: count,
    })
}
