use std::fs;
use std::path::Path;

use csv::ReaderBuilder;

use crate::errors::ReaderError;
use crate::formats::{header_cell, text_cell};
use crate::model::RawTable;
use crate::registry::TableReader;

const READER_NAME: &str = "csv";

/// Comma-separated text with a single header row.
pub struct CsvTableReader;

impl TableReader for CsvTableReader {
    fn name(&self) -> &'static str {
        READER_NAME
    }

    fn read(&self, path: &Path) -> Result<RawTable, ReaderError> {
        let bytes = fs::read(path).map_err(|source| ReaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.read_bytes(&bytes)
    }
}

impl CsvTableReader {
    pub fn read_bytes(&self, bytes: &[u8]) -> Result<RawTable, ReaderError> {
        let text = std::str::from_utf8(bytes).map_err(|err| ReaderError::FormatMismatch {
            reader: READER_NAME,
            reason: format!("input is not UTF-8 text ({err})"),
        })?;

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|source| ReaderError::Csv {
                reader: READER_NAME,
                source,
            })?
            .iter()
            .map(header_cell)
            .collect();

        if headers.iter().all(String::is_empty) {
            return Err(ReaderError::EmptyData {
                reader: READER_NAME,
            });
        }

        let width = headers.len();
        let mut rows = Vec::new();

        for (idx, record) in reader.records().enumerate() {
            let record = record.map_err(|source| ReaderError::Csv {
                reader: READER_NAME,
                source,
            })?;

            // Trailing empty fields are harmless; real extra data is not.
            let extra = record.iter().skip(width).any(|value| !value.is_empty());
            if extra {
                return Err(ReaderError::DataRow {
                    reader: READER_NAME,
                    row_index: idx + 1,
                    message: format!(
                        "expected at most {width} fields, found {}",
                        record.len()
                    ),
                });
            }

            rows.push(record.iter().take(width).map(text_cell).collect());
        }

        Ok(RawTable::new(headers, rows))
    }
}
