//! Core types for bench-export.
//!
//! This module holds the raw results handed over by the benchmark engine, the machine
//! snapshot, and the derived export document that the serializers render.

pub mod machine;
pub mod schema;

// Re-export key types for convenience
pub use machine::MachineInfo;
pub use schema::{
    BenchmarkRun, ExportDocument, MetricSummary, Percentile, RawMetricResult, TestSummary,
};
