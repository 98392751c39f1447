#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

use bench_export::ExportFormat;
use bench_export::export_cmd::{self, ExportArgs};

#[derive(Parser, Debug)]
#[command(name = "bench-export")]
#[command(about = "Export benchmark results as JSON and Influx-style CSV", long_about = None)]
struct Cli {
    /// Enable verbose logging (or set BENCH_EXPORT_LOG)
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Export a benchmark run to .exportableBenchmarks
    Export {
        /// Benchmark results produced by the benchmark engine (JSON or YAML)
        #[arg(long)]
        input: std::path::PathBuf,
        /// Benchmark target (suite) name
        #[arg(long)]
        target: String,
        /// Named baseline to export under (defaults to "exportable")
        #[arg(long)]
        baseline: Option<String>,
        /// Host identifier used in the file name (or set BENCH_EXPORT_HOST_IDENTIFIER)
        #[arg(long)]
        host_identifier: Option<String>,
        /// Base storage path (defaults to the current directory)
        #[arg(long)]
        path: Option<std::path::PathBuf>,
        /// Formats to export: json, influx (repeatable or comma separated)
        #[arg(long = "format", value_delimiter = ',')]
        formats: Vec<ExportFormat>,
        /// TOML config file with defaults for the options above
        #[arg(long)]
        config: Option<std::path::PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    let env = std::env::var("BENCH_EXPORT_LOG").unwrap_or_else(|_| {
        if verbose { "bench_export=debug".to_string() } else { "bench_export=info".to_string() }
    });
    let _ = tracing_subscriber::fmt()
        .with_span_events(FmtSpan::ACTIVE)
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_env_filter(EnvFilter::new(env))
        .try_init();
}

fn main() {
    color_eyre::install().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Export { input, target, baseline, host_identifier, path, formats, config } => {
            export_cmd::run(ExportArgs {
                input,
                target,
                baseline_name: baseline,
                host_identifier,
                path,
                formats,
                config,
            })
        }
    };

    if let Err(e) = result {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}
