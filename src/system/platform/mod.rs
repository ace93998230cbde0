use std::path::Path;

use super::reader::CounterSource;

pub trait PlatformSources {
    /// Where the OS publishes cumulative per-core CPU counters, if anywhere.
    fn default_stat_path() -> Option<&'static Path>;

    /// Counter source to use when no path was configured.
    fn default_counter_source() -> Box<dyn CounterSource>;
}

#[cfg(target_os = "linux")]
mod linux;
#[cfg(not(target_os = "linux"))]
mod unsupported;

#[cfg(target_os = "linux")]
use linux as platform_impl;
#[cfg(not(target_os = "linux"))]
use unsupported as platform_impl;

pub fn default_stat_path() -> Option<&'static Path> {
    platform_impl::Platform::default_stat_path()
}

pub fn default_counter_source() -> Box<dyn CounterSource> {
    platform_impl::Platform::default_counter_source()
}
