use std::path::{Path, PathBuf};

use super::counters::Snapshot;
use super::memory::{MemorySample, MemorySource, SysinfoMemory};
use super::platform;
use super::reader::{CounterSource, ProcStatReader};
use crate::error::SampleError;

/// Owns the OS sources the monitor loop reads from.
pub struct Collector {
    counters: Box<dyn CounterSource>,
    memory: Box<dyn MemorySource>,
    counter_path: Option<PathBuf>,
}

impl Collector {
    /// Platform sources, or a `/proc/stat`-formatted file at `stat_path`.
    pub fn new(stat_path: Option<&Path>) -> Self {
        let (counters, counter_path): (Box<dyn CounterSource>, _) = match stat_path {
            Some(path) => {
                tracing::info!(path = %path.display(), "cpu counters from configured path");
                (Box::new(ProcStatReader::new(path)), Some(path.to_path_buf()))
            }
            None => {
                let default = platform::default_stat_path();
                match default {
                    Some(path) => {
                        tracing::info!(path = %path.display(), "cpu counters from platform path");
                    }
                    None => tracing::warn!("no cpu counter source on this platform"),
                }
                (
                    platform::default_counter_source(),
                    default.map(Path::to_path_buf),
                )
            }
        };
        Collector {
            counters,
            memory: Box::new(SysinfoMemory::new()),
            counter_path,
        }
    }

    pub fn with_sources(counters: Box<dyn CounterSource>, memory: Box<dyn MemorySource>) -> Self {
        Collector {
            counters,
            memory,
            counter_path: None,
        }
    }

    /// File the counters are read from; `None` for injected or unsupported sources.
    pub fn counter_path(&self) -> Option<&Path> {
        self.counter_path.as_deref()
    }

    pub fn read_counters(&mut self) -> Result<Snapshot, SampleError> {
        self.counters.read()
    }

    pub fn sample_memory(&mut self) -> Result<MemorySample, SampleError> {
        self.memory.sample()
    }
}
