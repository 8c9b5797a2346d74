use std::path::Path;

use tracing::debug;

use crate::errors::{ReaderAttempt, ReaderError};
use crate::formats::{CsvTableReader, ExcelTableReader};
use crate::model::{ColumnNames, RawTable, SignupTable};

pub trait TableReader {
    fn name(&self) -> &'static str;
    fn read(&self, path: &Path) -> Result<RawTable, ReaderError>;
}

/// Reads a signup table, choosing readers from the file extension. Files with an unknown
/// extension are offered to every reader in turn.
pub fn read_signup_table(path: &Path, columns: &ColumnNames) -> Result<SignupTable, ReaderError> {
    if !path.is_file() {
        return Err(ReaderError::MissingFile(path.to_path_buf()));
    }

    let csv = CsvTableReader;
    let excel = ExcelTableReader;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    let readers: Vec<&dyn TableReader> = match extension.as_deref() {
        Some("csv") | Some("txt") => vec![&csv],
        Some("xls") | Some("xlsx") | Some("xlsm") | Some("xlsb") | Some("ods") => vec![&excel],
        _ => vec![&excel, &csv],
    };

    let raw = read_with_readers(path, &readers)?;
    SignupTable::from_raw(raw, columns)
}

pub fn read_with_readers(
    path: &Path,
    readers: &[&dyn TableReader],
) -> Result<RawTable, ReaderError> {
    let mut attempts = Vec::new();

    for reader in readers {
        match reader.read(path) {
            Ok(raw) => {
                debug!(
                    reader = reader.name(),
                    rows = raw.rows.len(),
                    "reader accepted input"
                );
                return Ok(raw);
            }
            Err(ReaderError::FormatMismatch { reason, .. }) => {
                attempts.push(ReaderAttempt::new(reader.name(), reason));
            }
            Err(err) => return Err(err),
        }
    }

    Err(ReaderError::NoMatchingReader { attempts })
}
