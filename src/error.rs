use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SampleError {
    /// The counter or memory source could not be opened or read at all.
    #[error("counter source `{source_name}` is unavailable: {source}")]
    SourceUnavailable {
        source_name: String,
        #[source]
        source: io::Error,
    },

    /// A single record did not parse. Readers skip these and keep scanning.
    #[error("malformed record `{line}`: {reason}")]
    MalformedRecord { line: String, reason: String },

    /// Two snapshots cannot be paired record-for-record.
    #[error("snapshot mismatch ({prev} previous vs {curr} current records): {detail}")]
    SnapshotMismatch {
        prev: usize,
        curr: usize,
        detail: String,
    },
}

impl SampleError {
    pub fn unavailable(source_name: impl Into<String>, source: io::Error) -> Self {
        SampleError::SourceUnavailable {
            source_name: source_name.into(),
            source,
        }
    }

    pub fn malformed(line: &str, reason: impl Into<String>) -> Self {
        SampleError::MalformedRecord {
            line: line.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the monitor loop can carry on to the next cycle.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, SampleError::SourceUnavailable { .. })
    }
}
