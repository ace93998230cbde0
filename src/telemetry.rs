use std::fs::{self, File};
use std::path::Path;
use std::str::FromStr;

use color_eyre::eyre::{Result, eyre};
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

/// Parse a level name, falling back to `WARN` for anything unrecognised.
pub fn parse_level(name: &str) -> Level {
    Level::from_str(name.trim()).unwrap_or(Level::WARN)
}

/// Human-readable trace events on stderr, keeping stdout for reports.
pub fn init_tracing_stderr(level: Level) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| eyre!("failed to set tracing subscriber: {e}"))
}

/// JSON-lines trace events, with span close timings, written to `output_path`.
pub fn init_tracing_json(output_path: &Path, level: Level) -> Result<()> {
    ensure_parent_dir(output_path)?;
    let file = File::create(output_path)?;
    let make_writer = move || {
        file.try_clone()
            .expect("failed to clone trace output file")
    };

    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .json()
        .with_span_events(FmtSpan::CLOSE)
        .with_max_level(level)
        .with_writer(make_writer)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| eyre!("failed to set tracing subscriber: {e}"))
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}
