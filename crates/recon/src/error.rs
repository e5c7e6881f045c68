use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReconError>;

#[derive(Debug, Error)]
pub enum ReconError {
    /// Table has no header row or cannot be parsed.
    #[error("malformed input '{input}': {reason}")]
    MalformedInput { input: String, reason: String },
    /// A requested field name is absent from the header.
    #[error("could not find field '{field}' in {input}")]
    MissingField { field: String, input: String },
    /// A cluster or pair refers to a row position outside the ingested table.
    #[error("{side}: row {index} does not exist (table has {len} data rows)")]
    DanglingReference { side: String, index: usize, len: usize },
    /// Source unreadable or destination unwritable.
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// CSV reader/writer error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// Resolution-result file could not be decoded.
    #[error("resolution file: {0}")]
    ResolutionFile(String),
}

impl ReconError {
    pub(crate) fn malformed(input: &str, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
