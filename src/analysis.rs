//! Utilization from two cumulative counter snapshots.
//!
//! Counters only ever grow, so a single snapshot says nothing about current
//! load. Pairing two of them gives active and idle tick deltas per core:
//!
//! ```text
//! idle   = idle + iowait
//! active = user + nice + system + irq + softirq + steal + guest + guest_nice
//! usage  = 100 * d(active) / (d(active) + d(idle))
//! ```

use serde::Serialize;

use crate::error::SampleError;
use crate::system::counters::{CoreCounterRecord, CoreLabel, Snapshot};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Utilization {
    pub label: CoreLabel,
    pub usage_percent: f64,
    pub idle_percent: f64,
}

/// Active and idle ticks elapsed between two readings of one core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickDelta {
    pub active: u64,
    pub idle: u64,
}

impl TickDelta {
    /// A counter that went backwards (reset, hotplug) counts as zero elapsed.
    pub fn between(prev: &CoreCounterRecord, curr: &CoreCounterRecord) -> Self {
        TickDelta {
            active: curr.active_time().saturating_sub(prev.active_time()),
            idle: curr.idle_time().saturating_sub(prev.idle_time()),
        }
    }

    pub fn total(&self) -> u64 {
        self.active.saturating_add(self.idle)
    }

    pub fn usage_percent(&self) -> f64 {
        percent_of(self.active, self.total())
    }

    pub fn idle_percent(&self) -> f64 {
        percent_of(self.idle, self.total())
    }
}

fn percent_of(part: u64, total: u64) -> f64 {
    // No ticks elapsed: report 0% rather than NaN.
    if total == 0 {
        return 0.0;
    }
    100.0 * part as f64 / total as f64
}

/// Compare `prev` and `curr` record by record, in `curr` order.
///
/// Records are paired by position; the labels must agree at every position.
pub fn analyze(prev: &Snapshot, curr: &Snapshot) -> Result<Vec<Utilization>, SampleError> {
    let _span = tracing::trace_span!("analysis.analyze", cores = curr.len()).entered();

    if prev.len() != curr.len() {
        return Err(SampleError::SnapshotMismatch {
            prev: prev.len(),
            curr: curr.len(),
            detail: "core count changed between snapshots".to_string(),
        });
    }

    prev.iter()
        .zip(curr)
        .map(|(p, c)| {
            if p.label != c.label {
                return Err(SampleError::SnapshotMismatch {
                    prev: prev.len(),
                    curr: curr.len(),
                    detail: format!("label `{}` paired with `{}`", p.label, c.label),
                });
            }
            let delta = TickDelta::between(p, c);
            Ok(Utilization {
                label: c.label,
                usage_percent: delta.usage_percent(),
                idle_percent: delta.idle_percent(),
            })
        })
        .collect()
}
