use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone)]
pub struct ReaderAttempt {
    pub reader: &'static str,
    pub message: String,
}

impl ReaderAttempt {
    pub fn new(reader: &'static str, message: impl Into<String>) -> Self {
        Self {
            reader,
            message: message.into(),
        }
    }
}

impl fmt::Display for ReaderAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.reader, self.message)
    }
}

#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("input file '{}' not found", .0.display())]
    MissingFile(PathBuf),

    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{reader} format mismatch: {reason}")]
    FormatMismatch {
        reader: &'static str,
        reason: String,
    },

    #[error("{reader} CSV error: {source}")]
    Csv {
        reader: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error("{reader} workbook error: {message}")]
    Workbook {
        reader: &'static str,
        message: String,
    },

    #[error("{reader} data row {row_index} invalid: {message}")]
    DataRow {
        reader: &'static str,
        row_index: usize,
        message: String,
    },

    #[error("{reader} file did not contain a header row")]
    EmptyData { reader: &'static str },

    #[error("required column '{column}' is missing; found columns {found:?}")]
    MissingColumn { column: String, found: Vec<String> },

    #[error("column '{0}' appears more than once in the header")]
    DuplicateColumn(String),

    #[error("no reader recognized this file; attempts: {attempts:?}")]
    NoMatchingReader { attempts: Vec<ReaderAttempt> },
}
