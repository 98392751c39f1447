//! Influx-style annotated CSV for time-series ingestion.
//!
//! Layout, one item per line:
//! - `#constant measurement,<target>`
//! - five `#constant tag,<key>,<value>` lines describing the machine
//! - the `#datatype` annotation and the column header
//! - one row per raw sample value of every metric of every test
//!
//! Values are never quoted. Field values are controlled identifiers and must not
//! contain commas.

use csv::{QuoteStyle, WriterBuilder};

use super::clock::{Clock, SystemClock, iso8601_seconds};
use crate::core::schema::ExportDocument;
use crate::{BenchError, BenchResult};

/// Column datatype annotation, first field included.
pub const DATATYPE_ANNOTATION: &[&str] = &[
    "#datatype tag",
    "tag",
    "tag",
    "double",
    "double",
    "long",
    "long",
    "dateTime",
];

/// Column headers in deterministic order.
pub const CSV_HEADERS: &[&str] = &[
    "metric",
    "unit",
    "test",
    "value",
    "test_average",
    "iterations",
    "warmup_iterations",
    "time",
];

/// Number of lines preceding the first data row.
pub const PREAMBLE_LINES: usize = 8;

/// Formatter for the annotated CSV export.
#[derive(Debug, Clone, Default)]
pub struct InfluxCsvFormatter<C = SystemClock> {
    clock: C,
}

impl InfluxCsvFormatter<SystemClock> {
    pub fn new() -> Self {
        InfluxCsvFormatter { clock: SystemClock }
    }
}

impl<C: Clock> InfluxCsvFormatter<C> {
    /// Create a formatter that timestamps rows with `clock`.
    pub fn with_clock(clock: C) -> Self {
        InfluxCsvFormatter { clock }
    }

    /// Render `doc` to annotated CSV text.
    ///
    /// Every data row reads the clock as it is rendered.
    ///
    /// # Errors
    /// Returns an error if the timestamp cannot be formatted or the CSV writer fails.
    pub fn format(&self, doc: &ExportDocument) -> BenchResult<String> {
        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Never)
            .flexible(true)
            .from_writer(Vec::new());

        writer.write_record(["#constant measurement", doc.target.as_str()])?;

        let machine = &doc.machine;
        let processors = machine.processors.to_string();
        let memory = machine.memory.to_string();
        let machine_tags = [
            ("hostName", hyphenate(&machine.hostname)),
            ("processors", processors),
            ("processorType", hyphenate(&machine.processor_type)),
            ("memory", memory),
            ("kernelVersion", hyphenate(&machine.kernel_version)),
        ];
        for (key, value) in &machine_tags {
            writer.write_record(["#constant tag", *key, value.as_str()])?;
        }

        writer.write_record(DATATYPE_ANNOTATION)?;
        writer.write_record(CSV_HEADERS)?;

        for test in &doc.tests {
            let iterations = test.iterations.to_string();
            let warmup = test.warmup_iterations.to_string();

            for metric in &test.metrics {
                let name = metric.metric.replace(' ', "");
                let average = format_average(metric.average);

                for value in &metric.samples {
                    let time = iso8601_seconds(self.clock.now())?;
                    let value = value.to_string();
                    writer.write_record([
                        name.as_str(),
                        metric.units.as_str(),
                        test.name.as_str(),
                        value.as_str(),
                        average.as_str(),
                        iterations.as_str(),
                        warmup.as_str(),
                        time.as_str(),
                    ])?;
                }
            }
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| BenchError::Message(format!("failed to flush CSV writer: {e}")))?;
        String::from_utf8(bytes).map_err(|e| BenchError::Message(format!("CSV output is not UTF-8: {e}")))
    }
}

/// Render `doc` with wall-clock timestamps.
pub fn to_csv(doc: &ExportDocument) -> BenchResult<String> {
    InfluxCsvFormatter::new().format(doc)
}

fn hyphenate(value: &str) -> String {
    value.replace(' ', "-")
}

/// Plain decimal that always carries a fractional part (`20.0`, `20.5`), never an exponent.
fn format_average(average: f64) -> String {
    let plain = average.to_string();
    if average.is_finite() && !plain.contains('.') {
        format!("{plain}.0")
    } else {
        plain
    }
}
