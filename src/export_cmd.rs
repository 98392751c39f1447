//! `export` command: turn a benchmark run into JSON and Influx CSV exports.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::core::machine::MachineInfo;
use crate::core::schema::BenchmarkRun;
use crate::export::{Clock, ExportFormat, ExportWriter, SystemClock, assemble};
use crate::{BenchError, BenchResult, ExportDocument};

/// Environment variable consulted when no host identifier is configured.
pub const HOST_IDENTIFIER_ENV: &str = "BENCH_EXPORT_HOST_IDENTIFIER";

/// Optional TOML configuration for the export command.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    #[serde(default)]
    pub base_path: Option<PathBuf>,
    #[serde(default)]
    pub baseline_name: Option<String>,
    #[serde(default)]
    pub host_identifier: Option<String>,
    #[serde(default)]
    pub formats: Option<Vec<ExportFormat>>,
}

pub fn load_export_config(path: &Path) -> BenchResult<ExportConfig> {
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: ExportConfig =
        toml::from_str(&s).with_context(|| format!("invalid config {}", path.display()))?;
    Ok(config)
}

/// Load the benchmark engine's results from JSON, or YAML for `.yaml`/`.yml` files.
pub fn load_benchmark_run(path: &Path) -> BenchResult<BenchmarkRun> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let run: anyhow::Result<BenchmarkRun> = if is_yaml {
        serde_yaml::from_slice(&bytes).map_err(anyhow::Error::from)
    } else {
        serde_json::from_slice(&bytes).map_err(anyhow::Error::from)
    };
    let run = run.with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(run)
}

/// Arguments of one export invocation.
#[derive(Debug, Clone, Default)]
pub struct ExportArgs {
    pub input: PathBuf,
    pub target: String,
    pub baseline_name: Option<String>,
    pub host_identifier: Option<String>,
    pub path: Option<PathBuf>,
    pub formats: Vec<ExportFormat>,
    pub config: Option<PathBuf>,
}

/// Settings after merging CLI arguments, config file and environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSettings {
    pub base_path: PathBuf,
    pub baseline_name: Option<String>,
    pub host_identifier: Option<String>,
    pub formats: Vec<ExportFormat>,
}

/// CLI arguments win over the config file, which wins over the environment.
pub fn resolve_settings(
    args: &ExportArgs,
    config: ExportConfig,
    env_host_identifier: Option<String>,
) -> ResolvedSettings {
    let base_path = args
        .path
        .clone()
        .or(config.base_path)
        .unwrap_or_else(|| PathBuf::from("."));
    let baseline_name = args.baseline_name.clone().or(config.baseline_name);
    let host_identifier = args
        .host_identifier
        .clone()
        .or(config.host_identifier)
        .or(env_host_identifier)
        .filter(|h| !h.is_empty());

    let mut formats = if args.formats.is_empty() {
        config
            .formats
            .unwrap_or_else(|| vec![ExportFormat::Json, ExportFormat::Influx])
    } else {
        args.formats.clone()
    };
    let mut seen = Vec::with_capacity(formats.len());
    formats.retain(|f| {
        if seen.contains(f) {
            false
        } else {
            seen.push(*f);
            true
        }
    });

    ResolvedSettings {
        base_path,
        baseline_name,
        host_identifier,
        formats,
    }
}

/// Result of exporting one document in several formats.
#[derive(Debug, Default)]
pub struct ExportOutcome {
    pub written: Vec<(ExportFormat, PathBuf)>,
    pub failed: Vec<(ExportFormat, BenchError)>,
}

impl ExportOutcome {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Render and write `doc` once per format. A failing format does not stop the others.
pub fn export_all<C: Clock + Copy>(
    doc: &ExportDocument,
    writer: &ExportWriter,
    settings: &ResolvedSettings,
    clock: C,
) -> ExportOutcome {
    let mut outcome = ExportOutcome::default();
    for format in &settings.formats {
        let result = format.render(doc, clock).and_then(|content| {
            writer.export(
                &doc.target,
                settings.baseline_name.as_deref(),
                settings.host_identifier.as_deref(),
                *format,
                &content,
            )
        });
        match result {
            Ok(path) => outcome.written.push((*format, path)),
            Err(e) => {
                error!(%format, "export failed: {e}");
                if let Some(hint) = e.remediation() {
                    warn!("{hint}");
                }
                outcome.failed.push((*format, e));
            }
        }
    }
    outcome
}

pub fn run(args: ExportArgs) -> BenchResult<ExportOutcome> {
    let config = match args.config.as_deref() {
        Some(path) => load_export_config(path)?,
        None => ExportConfig::default(),
    };
    let env_host = std::env::var(HOST_IDENTIFIER_ENV).ok();
    let settings = resolve_settings(&args, config, env_host);

    info!(input = %args.input.display(), "loading benchmark results");
    let run = load_benchmark_run(&args.input)?;
    let machine = match run.machine {
        Some(machine) => machine,
        None => {
            info!("no machine info in input, detecting from host");
            MachineInfo::detect()
        }
    };

    let doc = assemble(&machine, &args.target, &run.results);
    info!(
        suite = %doc.target,
        tests = doc.tests.len(),
        samples = doc.sample_count(),
        "assembled export document"
    );

    let writer = ExportWriter::new(&settings.base_path);
    let outcome = export_all(&doc, &writer, &settings, SystemClock);

    // Human summary
    for (format, path) in &outcome.written {
        println!("export: {format} -> {}", path.display());
    }
    for (format, e) in &outcome.failed {
        eprintln!("export: {format} failed: {e}");
        if let Some(hint) = e.remediation() {
            eprintln!("{hint}");
        }
    }

    if !outcome.is_success() {
        return Err(BenchError::Message(format!(
            "{} of {} exports failed",
            outcome.failed.len(),
            settings.formats.len()
        )));
    }
    Ok(outcome)
}
