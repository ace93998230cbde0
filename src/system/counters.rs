//! Raw per-core CPU time counters, as found in `/proc/stat`.
//!
//! Only `cpu`-prefixed lines are of interest. Each carries a label token and up
//! to ten cumulative tick counters:
//!
//! ```text
//! cpu  user nice system idle iowait irq softirq steal guest guest_nice
//! cpu0 ...
//! ```

use std::fmt;

use serde::Serialize;

use crate::error::SampleError;

pub const NUM_CPU_STATES: usize = 10;

/// Counters older kernels always report: user, nice, system, idle.
pub const MIN_CPU_STATES: usize = 4;

const CPU_PREFIX: &str = "cpu";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuState {
    User = 0,
    Nice,
    System,
    Idle,
    IoWait,
    Irq,
    SoftIrq,
    Steal,
    Guest,
    GuestNice,
}

impl CpuState {
    pub const IDLE: [CpuState; 2] = [CpuState::Idle, CpuState::IoWait];

    pub const ACTIVE: [CpuState; 8] = [
        CpuState::User,
        CpuState::Nice,
        CpuState::System,
        CpuState::Irq,
        CpuState::SoftIrq,
        CpuState::Steal,
        CpuState::Guest,
        CpuState::GuestNice,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum CoreLabel {
    Total,
    Core(u32),
}

impl fmt::Display for CoreLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Pad through the formatter so `{:>5}` works on labels.
            CoreLabel::Total => f.pad("total"),
            CoreLabel::Core(n) => f.pad(&n.to_string()),
        }
    }
}

impl From<CoreLabel> for String {
    fn from(label: CoreLabel) -> Self {
        label.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreCounterRecord {
    pub label: CoreLabel,
    pub state_times: [u64; NUM_CPU_STATES],
}

impl CoreCounterRecord {
    pub fn new(label: CoreLabel, state_times: [u64; NUM_CPU_STATES]) -> Self {
        Self { label, state_times }
    }

    pub fn time(&self, state: CpuState) -> u64 {
        self.state_times[state as usize]
    }

    /// Sums saturate: any `u64` token parses, so the sum may not fit.
    pub fn idle_time(&self) -> u64 {
        self.sum_of(&CpuState::IDLE)
    }

    pub fn active_time(&self) -> u64 {
        self.sum_of(&CpuState::ACTIVE)
    }

    fn sum_of(&self, states: &[CpuState]) -> u64 {
        states
            .iter()
            .map(|&s| self.time(s))
            .fold(0u64, u64::saturating_add)
    }
}

/// Aggregate record first, then cores in the order the source listed them.
pub type Snapshot = Vec<CoreCounterRecord>;

/// Whether `line` is a CPU record, judged by its first token.
pub fn is_cpu_line(line: &str) -> bool {
    line.split_whitespace()
        .next()
        .is_some_and(|token| token.starts_with(CPU_PREFIX))
}

/// Parse one `cpu` line. Missing trailing counters are zero-filled; counters
/// past the tenth are ignored.
pub fn parse_cpu_line(line: &str) -> Result<CoreCounterRecord, SampleError> {
    let mut tokens = line.split_whitespace();

    let ident = tokens
        .next()
        .ok_or_else(|| SampleError::malformed(line, "empty line"))?;
    let label = parse_label(ident).ok_or_else(|| {
        SampleError::malformed(line, format!("unrecognised cpu identifier `{ident}`"))
    })?;

    let mut state_times = [0u64; NUM_CPU_STATES];
    let mut count = 0;
    for token in tokens.take(NUM_CPU_STATES) {
        state_times[count] = token.parse().map_err(|_| {
            SampleError::malformed(line, format!("counter {count} is not an integer: `{token}`"))
        })?;
        count += 1;
    }

    if count < MIN_CPU_STATES {
        return Err(SampleError::malformed(
            line,
            format!("expected at least {MIN_CPU_STATES} counters, got {count}"),
        ));
    }

    Ok(CoreCounterRecord { label, state_times })
}

fn parse_label(ident: &str) -> Option<CoreLabel> {
    let rest = ident.strip_prefix(CPU_PREFIX)?;
    if rest.is_empty() {
        return Some(CoreLabel::Total);
    }
    rest.parse().ok().map(CoreLabel::Core)
}

/// Scan `contents` for the leading block of CPU records.
///
/// Malformed records are handed to `on_skip` and left out of the snapshot.
/// Scanning stops at the first non-CPU line after the block has started.
pub fn parse_snapshot<F>(contents: &str, mut on_skip: F) -> Snapshot
where
    F: FnMut(SampleError),
{
    let mut snapshot = Vec::new();
    let mut in_block = false;

    for line in contents.lines() {
        if !is_cpu_line(line) {
            if in_block {
                break;
            }
            continue;
        }
        in_block = true;
        match parse_cpu_line(line) {
            Ok(record) => snapshot.push(record),
            Err(err) => on_skip(err),
        }
    }

    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROC_STAT: &str = "\
cpu  4705 356 584 3699176 23 0 23 0 0 0
cpu0 1393 280 286 924378 9 0 16 0 0 0
cpu1 1080 21 95 925200 4 0 3 0 0 0
cpu2 1103 27 103 924912 6 0 2 0 0 0
intr 114930548 113199788 3 0 5 263 0 4 [... lots more numbers ...]
ctxt 1990473
btime 1062191376
cpu9 1 1 1 1 1 1 1 1 1 1
";

    #[test]
    fn labels_keep_scan_order() {
        let snapshot = parse_snapshot(PROC_STAT, |_| panic!("nothing should be skipped"));
        let labels: Vec<CoreLabel> = snapshot.iter().map(|r| r.label).collect();
        assert_eq!(
            labels,
            vec![
                CoreLabel::Total,
                CoreLabel::Core(0),
                CoreLabel::Core(1),
                CoreLabel::Core(2),
            ]
        );
    }

    #[test]
    fn stops_after_cpu_block() {
        let snapshot = parse_snapshot(PROC_STAT, |_| {});
        assert!(!snapshot.iter().any(|r| r.label == CoreLabel::Core(9)));
    }

    #[test]
    fn parses_all_ten_counters() {
        let record = parse_cpu_line("cpu3 1 2 3 4 5 6 7 8 9 10").unwrap();
        assert_eq!(record.label, CoreLabel::Core(3));
        assert_eq!(record.state_times, [1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        assert_eq!(record.time(CpuState::Steal), 8);
        assert_eq!(record.time(CpuState::GuestNice), 10);
    }

    #[test]
    fn short_record_is_zero_filled() {
        let record = parse_cpu_line("cpu 10 20 30 40 50 60").unwrap();
        assert_eq!(record.label, CoreLabel::Total);
        assert_eq!(&record.state_times[..6], &[10, 20, 30, 40, 50, 60]);
        assert_eq!(&record.state_times[6..], &[0, 0, 0, 0]);
    }

    #[test]
    fn extra_counters_are_ignored() {
        let record = parse_cpu_line("cpu0 1 1 1 1 1 1 1 1 1 1 99 99").unwrap();
        assert_eq!(record.state_times, [1; NUM_CPU_STATES]);
    }

    #[test]
    fn too_few_counters_is_malformed() {
        let err = parse_cpu_line("cpu0 1 2 3").unwrap_err();
        assert!(matches!(err, SampleError::MalformedRecord { .. }));
    }

    #[test]
    fn non_numeric_counter_is_malformed() {
        let err = parse_cpu_line("cpu0 1 2 x 4 5").unwrap_err();
        assert!(matches!(err, SampleError::MalformedRecord { .. }));
    }

    #[test]
    fn bad_core_index_is_malformed() {
        assert!(parse_cpu_line("cpuX 1 2 3 4").is_err());
        assert!(parse_cpu_line("cpu-1 1 2 3 4").is_err());
    }

    #[test]
    fn malformed_record_is_skipped_not_fatal() {
        let contents = "cpu 4 4 4 4\ncpu0 bad\ncpu1 2 2 2 2\nintr 1\n";
        let mut skipped = Vec::new();
        let snapshot = parse_snapshot(contents, |e| skipped.push(e));
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[1].label, CoreLabel::Core(1));
        assert_eq!(skipped.len(), 1);
    }

    #[test]
    fn active_and_idle_partition_the_states() {
        let record = parse_cpu_line("cpu 1 2 4 8 16 32 64 128 256 512").unwrap();
        assert_eq!(record.idle_time(), 8 + 16);
        assert_eq!(record.active_time(), 1 + 2 + 4 + 32 + 64 + 128 + 256 + 512);
        assert_eq!(record.idle_time() + record.active_time(), 1023);
    }

    #[test]
    fn state_sums_saturate_at_u64_max() {
        let record = parse_cpu_line("cpu 18446744073709551615 1 0 0").unwrap();
        assert_eq!(record.active_time(), u64::MAX);
        assert_eq!(record.idle_time(), 0);
    }

    #[test]
    fn label_display_pads() {
        assert_eq!(format!("{:>5}", CoreLabel::Core(3)), "    3");
        assert_eq!(format!("{:>5}", CoreLabel::Total), "total");
        assert_eq!(String::from(CoreLabel::Core(12)), "12");
    }
}
