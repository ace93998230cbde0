use std::fmt::Write;

use serde::Serialize;

use crate::analysis::Utilization;
use crate::system::memory::MemorySample;

#[derive(Debug, Serialize)]
struct CycleReport<'a> {
    cycle: u64,
    cores: &'a [Utilization],
    memory_percent: u64,
}

pub fn render_text(results: &[Utilization], memory: &MemorySample) -> String {
    let mut out = String::new();
    for r in results {
        let _ = writeln!(
            out,
            "{:>5}] active: {:6.2}% - idle: {:6.2}%",
            r.label, r.usage_percent, r.idle_percent
        );
    }
    let _ = writeln!(out, "Memory Load : {}%", memory.load_percent());
    out
}

/// One JSON object per cycle, newline terminated.
pub fn render_json(
    cycle: u64,
    results: &[Utilization],
    memory: &MemorySample,
) -> serde_json::Result<String> {
    let report = CycleReport {
        cycle,
        cores: results,
        memory_percent: memory.load_percent(),
    };
    let mut line = serde_json::to_string(&report)?;
    line.push('\n');
    Ok(line)
}
