use std::fs;
use std::path::{Path, PathBuf};

use super::counters::{Snapshot, parse_snapshot};
use crate::error::SampleError;

/// Something that can produce a fresh counter snapshot on demand.
pub trait CounterSource {
    fn read(&mut self) -> Result<Snapshot, SampleError>;
}

/// Reads a `/proc/stat`-formatted file, re-opening it on every call.
#[derive(Debug, Clone)]
pub struct ProcStatReader {
    path: PathBuf,
}

impl ProcStatReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CounterSource for ProcStatReader {
    fn read(&mut self) -> Result<Snapshot, SampleError> {
        let _span = tracing::trace_span!("reader.read", path = %self.path.display()).entered();

        let contents = fs::read_to_string(&self.path)
            .map_err(|e| SampleError::unavailable(self.path.display().to_string(), e))?;

        let snapshot = parse_snapshot(&contents, |err| {
            tracing::warn!(%err, "skipping cpu record");
        });
        tracing::trace!(records = snapshot.len(), "snapshot read");
        Ok(snapshot)
    }
}
