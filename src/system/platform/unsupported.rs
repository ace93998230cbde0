use std::io;
use std::path::Path;

use super::PlatformSources;
use crate::error::SampleError;
use crate::system::counters::Snapshot;
use crate::system::reader::CounterSource;

pub struct Platform;

/// Stands in for a counter source on platforms without `/proc/stat`.
/// A `stat_path` can still be configured to replay a captured file.
struct UnsupportedSource;

impl CounterSource for UnsupportedSource {
    fn read(&mut self) -> Result<Snapshot, SampleError> {
        Err(SampleError::unavailable(
            std::env::consts::OS,
            io::Error::new(
                io::ErrorKind::Unsupported,
                "no per-core tick counters on this platform; set general.stat_path",
            ),
        ))
    }
}

impl PlatformSources for Platform {
    fn default_stat_path() -> Option<&'static Path> {
        None
    }

    fn default_counter_source() -> Box<dyn CounterSource> {
        Box::new(UnsupportedSource)
    }
}
