use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, eyre};
use corestat::config::{Config, load_config, load_config_from_path};
use corestat::monitor::{Monitor, RunContext, Shutdown};
use corestat::report::{ConsoleFormat, CoreSelection, LogSettings, ReportSettings, Reporter};
use corestat::system::collector::Collector;
use corestat::telemetry;

#[derive(Parser)]
#[command(
    name = "corestat",
    about = "Sample per-core CPU and memory utilization to the console and a CSV log"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sampling interval in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Stop after this many reported cycles
    #[arg(long)]
    cycles: Option<u64>,

    /// Read counters from this /proc/stat-formatted file
    #[arg(long)]
    stat_path: Option<PathBuf>,

    /// Directory for the numbered CSV log
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Do not write a CSV log
    #[arg(long, default_value_t = false)]
    no_log: bool,

    /// Cores to report: all, last5
    #[arg(long)]
    cores: Option<String>,

    /// Console format: text, json
    #[arg(long)]
    format: Option<String>,

    /// Write trace events as JSON lines to this file instead of stderr.
    #[arg(long)]
    trace_json: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = load_config_for_cli(&cli);

    let level = telemetry::parse_level(&config.general.log_level);
    match &cli.trace_json {
        Some(path) => telemetry::init_tracing_json(path, level)?,
        None => telemetry::init_tracing_stderr(level)?,
    }

    if config.general.interval_ms == 0 {
        return Err(eyre!("interval must be greater than 0 ms"));
    }

    let shutdown = Shutdown::new();
    let ctx = RunContext {
        interval: Duration::from_millis(config.general.interval_ms),
        max_cycles: (config.general.cycles > 0).then_some(config.general.cycles),
        shutdown: shutdown.clone(),
    };

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, stopping");
            shutdown.trigger();
        }
    });

    let collector = Collector::new(config.general.stat_path.as_deref());
    let reporter = Reporter::open(report_settings(&config));
    let mut monitor = Monitor::new(collector, reporter);

    let summary = monitor
        .run(&ctx)
        .await
        .wrap_err("cpu counters could not be read")?;
    tracing::info!(
        cycles = summary.cycles,
        skipped = summary.skipped,
        "finished"
    );

    Ok(())
}

fn load_config_for_cli(cli: &Cli) -> Config {
    let mut config = match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    };

    if let Some(interval) = cli.interval_ms {
        config.general.interval_ms = interval;
    }
    if let Some(cycles) = cli.cycles {
        config.general.cycles = cycles;
    }
    if let Some(ref path) = cli.stat_path {
        config.general.stat_path = Some(path.clone());
    }
    if let Some(ref dir) = cli.log_dir {
        config.log.directory = dir.clone();
    }
    if cli.no_log {
        config.log.enabled = false;
    }
    if let Some(ref cores) = cli.cores {
        config.report.cores = cores.clone();
    }
    if let Some(ref format) = cli.format {
        config.report.format = format.clone();
    }

    config
}

fn report_settings(config: &Config) -> ReportSettings {
    let log = config.log.enabled.then(|| LogSettings {
        directory: config.log.directory.clone(),
        file_prefix: config.log.file_prefix.clone(),
        max_probe: config.log.max_probe,
    });

    ReportSettings {
        selection: CoreSelection::from_str_config(&config.report.cores),
        format: ConsoleFormat::from_str_config(&config.report.format),
        console: config.report.console,
        log,
    }
}
