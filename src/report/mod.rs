pub mod console;
pub mod csv_log;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::analysis::Utilization;
use crate::system::memory::MemorySample;
use csv_log::CsvLog;

/// Which analyzed records a cycle reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoreSelection {
    /// Every record in the snapshot, aggregate first.
    #[default]
    All,
    /// The trailing five records: the fixed four-core log layout.
    LastFive,
}

impl CoreSelection {
    pub fn from_str_config(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "last5" | "last_five" => CoreSelection::LastFive,
            _ => CoreSelection::All,
        }
    }

    pub fn select<'a>(&self, results: &'a [Utilization]) -> &'a [Utilization] {
        match self {
            CoreSelection::All => results,
            CoreSelection::LastFive => &results[results.len().saturating_sub(5)..],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleFormat {
    #[default]
    Text,
    Json,
}

impl ConsoleFormat {
    pub fn from_str_config(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => ConsoleFormat::Json,
            _ => ConsoleFormat::Text,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogSettings {
    pub directory: PathBuf,
    pub file_prefix: String,
    pub max_probe: u32,
}

#[derive(Debug, Clone, Default)]
pub struct ReportSettings {
    pub selection: CoreSelection,
    pub format: ConsoleFormat,
    pub console: bool,
    /// `None` disables the CSV log.
    pub log: Option<LogSettings>,
}

/// Console and CSV output for the monitor loop.
///
/// Owns the cycle counter and the log file; the file is closed when the
/// reporter is dropped.
pub struct Reporter<W: Write = io::Stdout> {
    settings: ReportSettings,
    out: W,
    log: Option<CsvLog>,
    cycle: u64,
}

impl Reporter<io::Stdout> {
    pub fn open(settings: ReportSettings) -> Self {
        Self::with_writer(settings, io::stdout())
    }
}

impl<W: Write> Reporter<W> {
    pub fn with_writer(settings: ReportSettings, mut out: W) -> Self {
        // JSON output stays one object per line; the path goes to the trace only.
        let announce = settings.console && settings.format == ConsoleFormat::Text;
        let log = settings.log.as_ref().and_then(|log| {
            match CsvLog::create_numbered(&log.directory, &log.file_prefix, log.max_probe) {
                Ok(csv) => {
                    if announce {
                        let _ = writeln!(out, "Logged at : {}", csv.path().display());
                    }
                    tracing::info!(path = %csv.path().display(), "csv log opened");
                    Some(csv)
                }
                Err(err) => {
                    tracing::warn!(%err, "csv log unavailable, continuing without it");
                    None
                }
            }
        });

        Reporter {
            settings,
            out,
            log,
            cycle: 0,
        }
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn log_path(&self) -> Option<&Path> {
        self.log.as_ref().map(CsvLog::path)
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    /// Emit one cycle. Output failures never stop the monitor: a failed CSV
    /// write disables the log, a failed console write is traced and dropped.
    pub fn report(&mut self, results: &[Utilization], memory: &MemorySample) {
        self.cycle += 1;
        let selected = self.settings.selection.select(results);

        if self.settings.console {
            let rendered = match self.settings.format {
                ConsoleFormat::Text => Ok(console::render_text(selected, memory)),
                ConsoleFormat::Json => console::render_json(self.cycle, selected, memory)
                    .map_err(io::Error::other),
            };
            let written = rendered.and_then(|text| {
                self.out.write_all(text.as_bytes())?;
                self.out.flush()
            });
            if let Err(err) = written {
                tracing::warn!(%err, cycle = self.cycle, "console report failed");
            }
        }

        if let Some(log) = self.log.as_mut()
            && let Err(err) = log.write_cycle(self.cycle, selected, memory)
        {
            tracing::warn!(%err, path = %log.path().display(), "csv write failed, disabling log");
            self.log = None;
        }
    }
}
