//! Assemble per-test metric results into one sorted `ExportDocument`.

use tracing::{debug, warn};

use super::aggregate::summarize;
use crate::core::machine::MachineInfo;
use crate::core::schema::{ExportDocument, RawMetricResult, TestSummary};

/// Build the export document for `target`.
///
/// Tests are ordered by name and metrics within a test by metric description, both
/// byte-wise lexicographic, so the same input always yields the same document.
/// Iteration and warmup counts come from the last metric of each test; metrics that
/// disagree are reported but not rejected.
pub fn assemble<'a, I>(machine: &MachineInfo, target: &str, results: I) -> ExportDocument
where
    I: IntoIterator<Item = (&'a String, &'a Vec<RawMetricResult>)>,
{
    let mut tests: Vec<(&String, &Vec<RawMetricResult>)> = results.into_iter().collect();
    tests.sort_by(|a, b| a.0.cmp(b.0));

    let tests = tests
        .into_iter()
        .map(|(name, raw)| assemble_test(name, raw))
        .collect();

    ExportDocument {
        machine: machine.clone(),
        target: target.to_string(),
        tests,
    }
}

fn assemble_test(name: &str, raw: &[RawMetricResult]) -> TestSummary {
    let mut sorted: Vec<&RawMetricResult> = raw.iter().collect();
    sorted.sort_by(|a, b| a.metric.cmp(&b.metric));

    let mut metrics = Vec::with_capacity(sorted.len());
    let mut counts: Option<(u64, u64)> = None;
    for result in sorted {
        metrics.push(summarize(result));

        let current = (result.measurements, result.warmup_iterations);
        if let Some(previous) = counts {
            if previous != current {
                warn!(
                    test = name,
                    metric = %result.metric,
                    "metrics disagree on iteration counts ({}/{} vs {}/{}), keeping the last",
                    previous.0,
                    previous.1,
                    current.0,
                    current.1
                );
            }
        }
        counts = Some(current);
    }

    let (iterations, warmup_iterations) = counts.unwrap_or((0, 0));
    debug!(test = name, metrics = metrics.len(), "assembled test summary");

    TestSummary {
        name: name.to_string(),
        iterations,
        warmup_iterations,
        metrics,
    }
}
