//! Per-metric aggregation: raw percentile samples to `MetricSummary`.

use tracing::warn;

use crate::core::schema::{MetricSummary, RawMetricResult};
use crate::{BenchError, BenchResult};

/// Arithmetic mean of `values` in double precision.
///
/// # Errors
/// Returns `BenchError::EmptySampleSet` when `values` is empty.
pub fn mean(metric: &str, values: &[u64]) -> BenchResult<f64> {
    if values.is_empty() {
        return Err(BenchError::EmptySampleSet {
            metric: metric.to_string(),
        });
    }
    let total: f64 = values.iter().map(|v| *v as f64).sum();
    Ok(total / values.len() as f64)
}

/// Summarize one raw metric result.
///
/// Samples keep the percentile mapping's stored order. An empty mapping yields an
/// average of 0.0 and a summary whose `has_samples()` is false.
pub fn summarize(raw: &RawMetricResult) -> MetricSummary {
    let samples: Vec<u64> = raw.percentiles.values().copied().collect();
    let average = match mean(&raw.metric, &samples) {
        Ok(avg) => avg,
        Err(e) => {
            warn!(metric = %raw.metric, "{e}, reporting average as 0.0");
            0.0
        }
    };

    MetricSummary {
        metric: raw.metric.clone(),
        units: raw.units.clone(),
        average,
        samples,
        percentiles: raw.percentiles.clone(),
    }
}
