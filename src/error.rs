use std::io;

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed transaction record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("duplicate key '{key}' in {table} reference table")]
    DuplicateReferenceKey { table: &'static str, key: String },

    #[error("no week windows derivable from {rows} rows (dates {min_date:?} to {max_date:?})")]
    EmptyPartition {
        rows: usize,
        min_date: Option<NaiveDate>,
        max_date: Option<NaiveDate>,
    },

    #[error("failed to write report '{label}': {source}")]
    SinkWriteFailure {
        label: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedRecord {
            line: 0,
            reason: reason.into(),
        }
    }

    /// Attach the 1-based source line to a `MalformedRecord`.
    pub(crate) fn at_line(self, line: usize) -> Self {
        match self {
            Error::MalformedRecord { reason, .. } => Error::MalformedRecord { line, reason },
            other => other,
        }
    }
}
