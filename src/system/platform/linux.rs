use std::path::Path;

use super::PlatformSources;
use crate::system::reader::{CounterSource, ProcStatReader};

const PROC_STAT: &str = "/proc/stat";

pub struct Platform;

impl PlatformSources for Platform {
    fn default_stat_path() -> Option<&'static Path> {
        Some(Path::new(PROC_STAT))
    }

    fn default_counter_source() -> Box<dyn CounterSource> {
        Box::new(ProcStatReader::new(PROC_STAT))
    }
}
