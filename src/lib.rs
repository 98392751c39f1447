pub mod core;
pub mod export;
pub mod export_cmd;

use std::path::PathBuf;

use thiserror::Error;

pub use crate::core::{BenchmarkRun, ExportDocument, MachineInfo, MetricSummary, Percentile, RawMetricResult, TestSummary};
pub use crate::export::{ExportFormat, ExportWriter};

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("{0}")]
    Message(String),
    #[error("lacking permissions to write to {}", path.display())]
    PermissionDenied { path: PathBuf },
    #[error("failed to write {}, errno = [{}]: {source}", path.display(), source.raw_os_error().unwrap_or(0))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("metric '{metric}' has no samples")]
    EmptySampleSet { metric: String },
    #[error("invalid target name '{0}'")]
    InvalidTarget(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl BenchError {
    /// Classify an I/O failure on `path`.
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => BenchError::PermissionDenied { path },
            _ => BenchError::Io { path, source },
        }
    }

    /// Actionable guidance for errors the user can fix themselves.
    pub fn remediation(&self) -> Option<String> {
        match self {
            BenchError::PermissionDenied { path } => {
                let dir = path.parent().unwrap_or(path.as_path());
                Some(format!(
                    "Give the exporter write access to {} (or pass --path with a writable directory) and re-run the export.",
                    dir.display()
                ))
            }
            _ => None,
        }
    }
}

pub type BenchResult<T> = Result<T, BenchError>;
