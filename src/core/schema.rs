//! Raw benchmark results and the derived export document.
//!
//! The wire names of `ExportDocument` and everything below it are a fixed contract with
//! downstream consumers. Renaming a field here is a breaking change.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::machine::MachineInfo;

/// Percentile points reported by the benchmark engine.
///
/// Declaration order is the canonical reporting order, and `Ord` follows it, so a
/// `BTreeMap<Percentile, _>` iterates p0 first and p100 last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Percentile {
    P0,
    P25,
    P50,
    P75,
    P90,
    P99,
    P100,
}

impl Percentile {
    pub const ALL: [Percentile; 7] = [
        Percentile::P0,
        Percentile::P25,
        Percentile::P50,
        Percentile::P75,
        Percentile::P90,
        Percentile::P99,
        Percentile::P100,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Percentile::P0 => "p0",
            Percentile::P25 => "p25",
            Percentile::P50 => "p50",
            Percentile::P75 => "p75",
            Percentile::P90 => "p90",
            Percentile::P99 => "p99",
            Percentile::P100 => "p100",
        }
    }
}

impl fmt::Display for Percentile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Percentile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Percentile::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown percentile '{s}'"))
    }
}

/// One metric of one benchmark as produced by the benchmark engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMetricResult {
    /// Metric description, e.g. "Time (wall clock)"
    pub metric: String,
    /// Unit description, e.g. "ns" or "ops/s"
    pub units: String,
    pub percentiles: BTreeMap<Percentile, u64>,
    /// Number of measured iterations
    pub measurements: u64,
    #[serde(default)]
    pub warmup_iterations: u64,
}

/// Hand-off document from the benchmark engine: results keyed by unique test name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchmarkRun {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine: Option<MachineInfo>,
    pub results: BTreeMap<String, Vec<RawMetricResult>>,
}

/// Aggregated view of a single metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub metric: String,
    pub units: String,
    /// Arithmetic mean of `samples`, or 0.0 when there are none (see `has_samples`)
    pub average: f64,
    /// Sample values in the order the percentile mapping stores them
    #[serde(rename = "metricsdata")]
    pub samples: Vec<u64>,
    pub percentiles: BTreeMap<Percentile, u64>,
}

impl MetricSummary {
    /// False when the metric had no samples and `average` is only the 0.0 fallback.
    pub fn has_samples(&self) -> bool {
        !self.samples.is_empty()
    }
}

/// All metrics of one benchmark test, sorted by metric name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSummary {
    #[serde(rename = "test")]
    pub name: String,
    pub iterations: u64,
    pub warmup_iterations: u64,
    #[serde(rename = "data")]
    pub metrics: Vec<MetricSummary>,
}

/// Root export document, tests sorted by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    #[serde(rename = "benchmarkMachine")]
    pub machine: MachineInfo,
    pub target: String,
    #[serde(rename = "benchmarks")]
    pub tests: Vec<TestSummary>,
}

impl ExportDocument {
    /// Total number of raw samples across all tests and metrics.
    pub fn sample_count(&self) -> usize {
        self.tests
            .iter()
            .flat_map(|t| t.metrics.iter())
            .map(|m| m.samples.len())
            .sum()
    }
}
