use std::fmt::Write as _;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::analysis::Utilization;
use crate::system::counters::CoreLabel;
use crate::system::memory::MemorySample;

/// Append-only CSV log, one row per reported cycle.
///
/// The first cycle fixes the column layout. Cycles whose labels differ from
/// it (cores hot-plugged after a re-baseline) are not logged.
#[derive(Debug)]
pub struct CsvLog {
    path: PathBuf,
    writer: BufWriter<File>,
    header: Option<Vec<CoreLabel>>,
}

impl CsvLog {
    /// Create `<dir>/<prefix><n>.csv` for the first `n` in `0..max_probe` not
    /// already taken, so earlier runs are never overwritten.
    pub fn create_numbered(dir: &Path, prefix: &str, max_probe: u32) -> io::Result<Self> {
        fs::create_dir_all(dir)?;

        for n in 0..max_probe {
            let path = dir.join(format!("{prefix}{n}.csv"));
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => {
                    return Ok(CsvLog {
                        path,
                        writer: BufWriter::new(file),
                        header: None,
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            }
        }

        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!(
                "{prefix}0.csv through {prefix}{}.csv already exist in {}",
                max_probe.saturating_sub(1),
                dir.display()
            ),
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write one cycle, preceded by the header on first use. Flushed per row.
    ///
    /// Returns `Ok(false)` when the row was dropped because its labels don't
    /// match the header.
    pub fn write_cycle(
        &mut self,
        cycle: u64,
        results: &[Utilization],
        memory: &MemorySample,
    ) -> io::Result<bool> {
        match &self.header {
            Some(header) => {
                if !header.iter().copied().eq(results.iter().map(|r| r.label)) {
                    tracing::warn!(
                        cycle,
                        columns = header.len(),
                        cores = results.len(),
                        path = %self.path.display(),
                        "core layout changed, csv row skipped"
                    );
                    return Ok(false);
                }
            }
            None => {
                let labels: Vec<CoreLabel> = results.iter().map(|r| r.label).collect();
                writeln!(self.writer, "{}", header_row(&labels))?;
                self.header = Some(labels);
            }
        }
        writeln!(self.writer, "{}", data_row(cycle, results, memory))?;
        self.writer.flush()?;
        Ok(true)
    }
}

pub fn header_row(labels: &[CoreLabel]) -> String {
    let mut row = String::from("Time(s)");
    for label in labels {
        match label {
            CoreLabel::Total => row.push_str(",CPU[Total](%)"),
            CoreLabel::Core(n) => {
                let _ = write!(row, ",CPU[{n}](%)");
            }
        }
    }
    row.push_str(",Memory(%)");
    row
}

pub fn data_row(cycle: u64, results: &[Utilization], memory: &MemorySample) -> String {
    let mut row = cycle.to_string();
    for r in results {
        let _ = write!(row, ",{:.2}", r.usage_percent);
    }
    let _ = write!(row, ",{}", memory.load_percent());
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "corestat_csv_{}_{name}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn util(label: CoreLabel, usage: f64) -> Utilization {
        Utilization {
            label,
            usage_percent: usage,
            idle_percent: 100.0 - usage,
        }
    }

    #[test]
    fn header_for_four_cores() {
        let labels = [
            CoreLabel::Total,
            CoreLabel::Core(0),
            CoreLabel::Core(1),
            CoreLabel::Core(2),
            CoreLabel::Core(3),
        ];
        assert_eq!(
            header_row(&labels),
            "Time(s),CPU[Total](%),CPU[0](%),CPU[1](%),CPU[2](%),CPU[3](%),Memory(%)"
        );
    }

    #[test]
    fn data_row_uses_two_decimals() {
        let memory = MemorySample {
            total_bytes: 100,
            free_bytes: 58,
        };
        let row = data_row(
            7,
            &[util(CoreLabel::Total, 200.0 / 3.0), util(CoreLabel::Core(0), 5.0)],
            &memory,
        );
        assert_eq!(row, "7,66.67,5.00,42");
    }

    #[test]
    fn numbering_skips_existing_files() {
        let dir = temp_dir("numbering");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("log0.csv"), "old run").unwrap();
        fs::write(dir.join("log1.csv"), "old run").unwrap();

        let log = CsvLog::create_numbered(&dir, "log", 100).unwrap();
        assert_eq!(log.path(), dir.join("log2.csv"));
        assert_eq!(fs::read_to_string(dir.join("log0.csv")).unwrap(), "old run");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn exhausted_probe_range_is_an_error() {
        let dir = temp_dir("exhausted");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("cpu0.csv"), "").unwrap();
        fs::write(dir.join("cpu1.csv"), "").unwrap();

        let err = CsvLog::create_numbered(&dir, "cpu", 2).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn header_written_once_before_rows() {
        let dir = temp_dir("rows");
        let memory = MemorySample {
            total_bytes: 4,
            free_bytes: 3,
        };
        let mut log = CsvLog::create_numbered(&dir, "log", 10).unwrap();
        let rows = [util(CoreLabel::Total, 50.0), util(CoreLabel::Core(0), 12.5)];
        assert!(log.write_cycle(1, &rows, &memory).unwrap());
        assert!(log.write_cycle(2, &rows, &memory).unwrap());

        let contents = fs::read_to_string(log.path()).unwrap();
        assert_eq!(
            contents,
            "Time(s),CPU[Total](%),CPU[0](%),Memory(%)\n1,50.00,12.50,25\n2,50.00,12.50,25\n"
        );
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn rows_with_a_different_core_layout_are_dropped() {
        let dir = temp_dir("layout");
        let memory = MemorySample {
            total_bytes: 4,
            free_bytes: 2,
        };
        let mut log = CsvLog::create_numbered(&dir, "log", 10).unwrap();
        let one_core = [util(CoreLabel::Total, 10.0), util(CoreLabel::Core(0), 10.0)];
        let three_cores = [
            util(CoreLabel::Total, 20.0),
            util(CoreLabel::Core(0), 20.0),
            util(CoreLabel::Core(1), 20.0),
            util(CoreLabel::Core(2), 20.0),
        ];
        assert!(log.write_cycle(1, &one_core, &memory).unwrap());
        assert!(!log.write_cycle(2, &three_cores, &memory).unwrap());
        assert!(log.write_cycle(3, &one_core, &memory).unwrap());

        let contents = fs::read_to_string(log.path()).unwrap();
        assert_eq!(
            contents,
            "Time(s),CPU[Total](%),CPU[0](%),Memory(%)\n1,10.00,10.00,50\n3,10.00,10.00,50\n"
        );
        let _ = fs::remove_dir_all(&dir);
    }
}
