use std::io;

use serde::Serialize;
use sysinfo::{MemoryRefreshKind, RefreshKind, System};

use crate::error::SampleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MemorySample {
    pub total_bytes: u64,
    pub free_bytes: u64,
}

impl MemorySample {
    /// Share of memory in use, truncated to a whole percent.
    pub fn load_percent(&self) -> u64 {
        if self.total_bytes == 0 {
            return 0;
        }
        let used = self.total_bytes.saturating_sub(self.free_bytes);
        (u128::from(used) * 100 / u128::from(self.total_bytes)) as u64
    }
}

pub trait MemorySource {
    fn sample(&mut self) -> Result<MemorySample, SampleError>;
}

/// Total/free RAM via `sysinfo`.
pub struct SysinfoMemory {
    sys: System,
}

impl Default for SysinfoMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoMemory {
    pub fn new() -> Self {
        let sys = System::new_with_specifics(
            RefreshKind::nothing().with_memory(MemoryRefreshKind::nothing().with_ram()),
        );
        SysinfoMemory { sys }
    }
}

impl MemorySource for SysinfoMemory {
    fn sample(&mut self) -> Result<MemorySample, SampleError> {
        self.sys
            .refresh_memory_specifics(MemoryRefreshKind::nothing().with_ram());

        let total_bytes = self.sys.total_memory();
        if total_bytes == 0 {
            return Err(SampleError::unavailable(
                "sysinfo memory",
                io::Error::other("total memory reported as zero"),
            ));
        }

        Ok(MemorySample {
            total_bytes,
            free_bytes: self.sys.free_memory(),
        })
    }
}
