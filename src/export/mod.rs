//! Export pipeline: aggregate raw results, assemble the document, render, persist.
//!
//! - `aggregate`: one raw metric to a `MetricSummary`
//! - `assemble`: per-test results to a sorted `ExportDocument`
//! - `json` / `influx`: renderers for the two export formats
//! - `writer`: path layout and overwrite semantics on disk

pub mod aggregate;
pub mod assemble;
pub mod clock;
pub mod influx;
pub mod json;
pub mod writer;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::BenchResult;
use crate::core::schema::ExportDocument;

// Re-export key types
pub use aggregate::{mean, summarize};
pub use assemble::assemble;
pub use clock::{Clock, FixedClock, SystemClock};
pub use influx::{CSV_HEADERS, InfluxCsvFormatter, to_csv};
pub use json::to_json;
pub use writer::{DEFAULT_BASELINE_DIR, EXPORTS_DIR, ExportWriter};

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    #[serde(alias = "csv")]
    Influx,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Influx => "csv",
        }
    }

    /// Render `doc` in this format using `clock` for CSV row timestamps.
    pub fn render<C: Clock>(&self, doc: &ExportDocument, clock: C) -> BenchResult<Vec<u8>> {
        match self {
            ExportFormat::Json => to_json(doc),
            ExportFormat::Influx => Ok(InfluxCsvFormatter::with_clock(clock).format(doc)?.into_bytes()),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Json => f.write_str("json"),
            ExportFormat::Influx => f.write_str("influx"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "influx" | "csv" => Ok(ExportFormat::Influx),
            other => Err(format!("unknown export format '{other}' (expected json or influx)")),
        }
    }
}
