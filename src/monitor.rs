use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::analysis::analyze;
use crate::error::SampleError;
use crate::report::Reporter;
use crate::system::collector::Collector;

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(1000);

/// Cloneable stop signal shared between the monitor loop and whoever may
/// want to end it (Ctrl-C handler, tests).
#[derive(Clone, Debug)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Shutdown {
            tx: Arc::new(tx),
            rx,
        }
    }

    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once `trigger` has been called.
    pub async fn triggered(&self) {
        let mut rx = self.rx.clone();
        let _ = rx.wait_for(|&stop| stop).await;
    }
}

#[derive(Clone, Debug)]
pub struct RunContext {
    pub interval: Duration,
    /// Stop after this many reported cycles.
    pub max_cycles: Option<u64>,
    pub shutdown: Shutdown,
}

impl Default for RunContext {
    fn default() -> Self {
        RunContext {
            interval: DEFAULT_INTERVAL,
            max_cycles: None,
            shutdown: Shutdown::new(),
        }
    }
}

impl RunContext {
    fn limit_reached(&self, cycles: u64) -> bool {
        self.max_cycles.is_some_and(|max| cycles >= max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub cycles: u64,
    pub skipped: u64,
    pub cancelled: bool,
}

/// Drives read → wait → read → analyze → report, one cycle at a time.
pub struct Monitor<W: Write = io::Stdout> {
    collector: Collector,
    reporter: Reporter<W>,
}

impl<W: Write> Monitor<W> {
    pub fn new(collector: Collector, reporter: Reporter<W>) -> Self {
        Monitor {
            collector,
            reporter,
        }
    }

    pub fn reporter(&self) -> &Reporter<W> {
        &self.reporter
    }

    /// Run until the cycle limit, cancellation, or an unreadable source.
    ///
    /// Each new snapshot becomes the baseline for the next cycle, so every
    /// cycle costs one read. A cycle whose snapshots cannot be paired is
    /// skipped without reporting.
    pub async fn run(&mut self, ctx: &RunContext) -> Result<RunSummary, SampleError> {
        let mut summary = RunSummary::default();

        if ctx.shutdown.is_triggered() {
            summary.cancelled = true;
            return Ok(summary);
        }
        let mut prev = self.collector.read_counters()?;

        while !ctx.limit_reached(summary.cycles) {
            if ctx.shutdown.is_triggered() {
                summary.cancelled = true;
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(ctx.interval) => {}
                _ = ctx.shutdown.triggered() => {
                    summary.cancelled = true;
                    break;
                }
            }

            let curr = self.collector.read_counters()?;
            let _span = tracing::debug_span!("monitor.cycle", cycle = summary.cycles + 1).entered();

            match analyze(&prev, &curr) {
                Ok(results) => {
                    let memory = self.collector.sample_memory()?;
                    self.reporter.report(&results, &memory);
                    summary.cycles += 1;
                }
                Err(err) if err.is_recoverable() => {
                    tracing::warn!(%err, "skipping cycle");
                    summary.skipped += 1;
                }
                Err(err) => return Err(err),
            }
            prev = curr;
        }

        tracing::debug!(
            cycles = summary.cycles,
            skipped = summary.skipped,
            cancelled = summary.cancelled,
            "monitor stopped"
        );
        Ok(summary)
    }
}
