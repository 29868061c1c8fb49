use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use kvmark_adapters::AdapterRegistry;
use kvmark_cli::config::ProfileConfig;
use kvmark_cli::output::{BenchmarkReport, OutputFormat};
use kvmark_core::WorkloadEngine;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// kvmark: workload-driven key-value store benchmark
///
/// Runs YCSB-style workloads against a store adapter and reports throughput
/// and latency per workload.
///
/// Example usage:
///   kvmark run --adapter memory --set workload=fillseq,ycsba --set num=100000
///   kvmark run -P profiles/memory-ycsb.toml --set threads=8
///   kvmark run -P profiles/redb-ycsb.toml --set redb-path=/tmp/bench.redb
///   kvmark adapters
///   kvmark completions bash > ~/.local/share/bash-completion/completions/kvmark
///
/// Options prefixed with `<adapter>-` are passed to the adapter with the
/// prefix removed; all others are benchmark options.
#[derive(Parser)]
#[command(name = "kvmark")]
#[command(version, about = "Workload-driven key-value store benchmark", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the configured workloads against an adapter
    Run {
        /// Adapter to benchmark (see `kvmark adapters`)
        #[arg(short, long)]
        adapter: Option<String>,

        /// Path to TOML profile
        #[arg(short = 'P', long)]
        profile: Option<PathBuf>,

        /// Set an option (can be specified multiple times)
        ///
        /// Examples:
        ///   --set num=1000000
        ///   --set workload=fillrandom,ycsbb
        ///   --set distribution=zipfian
        ///   --set redb-durability=none
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,

        /// Result format printed to stdout
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Human)]
        format: OutputFormat,
    },

    /// List available adapters
    Adapters,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for results
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    match cli.command {
        Commands::Run { adapter, profile, set, format } => {
            run_benchmark(adapter.as_deref(), profile, &set, format)
        }
        Commands::Adapters => {
            for (name, description) in AdapterRegistry::with_builtin().describe() {
                println!("{:<10} {}", name, description);
            }
            Ok(())
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "kvmark", &mut io::stdout());
            Ok(())
        }
    }
}

fn run_benchmark(
    adapter: Option<&str>,
    profile: Option<PathBuf>,
    overrides: &[String],
    format: OutputFormat,
) -> anyhow::Result<()> {
    let profile = match profile {
        Some(path) => {
            tracing::info!("Loading profile: {}", path.display());
            ProfileConfig::from_file(&path)?
        }
        None => ProfileConfig::default(),
    };
    let options = profile.to_options(adapter, overrides)?;

    let registry = AdapterRegistry::with_builtin();
    let store = registry.create(options.adapter())?;
    let engine = WorkloadEngine::setup(store, &options)
        .with_context(|| format!("Failed to set up adapter '{}'", options.adapter()))?;

    let summaries = engine.run()?;
    let report = BenchmarkReport::new(options.adapter(), engine.config().clone(), summaries);
    report.print(format)
}
