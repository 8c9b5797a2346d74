use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDateTime;
use tracing::debug;

use crate::errors::ReaderError;
use crate::formats::{float_cell, header_cell, text_cell};
use crate::model::RawTable;
use crate::registry::TableReader;

const READER_NAME: &str = "excel";

/// First worksheet of an `.xls`, `.xlsx`, `.xlsm`, `.xlsb` or `.ods` workbook.
pub struct ExcelTableReader;

impl TableReader for ExcelTableReader {
    fn name(&self) -> &'static str {
        READER_NAME
    }

    fn read(&self, path: &Path) -> Result<RawTable, ReaderError> {
        let mut workbook = open_workbook_auto(path).map_err(|err| ReaderError::FormatMismatch {
            reader: READER_NAME,
            reason: err.to_string(),
        })?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or(ReaderError::EmptyData {
                reader: READER_NAME,
            })?;

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|err| ReaderError::Workbook {
                reader: READER_NAME,
                message: format!("sheet '{sheet_name}': {err}"),
            })?;

        let mut rows_iter = range.rows();
        let header = rows_iter.next().ok_or(ReaderError::EmptyData {
            reader: READER_NAME,
        })?;
        let headers: Vec<String> = header
            .iter()
            .map(|cell| header_cell(&cell_value(cell).unwrap_or_default()))
            .collect();

        if headers.iter().all(String::is_empty) {
            return Err(ReaderError::EmptyData {
                reader: READER_NAME,
            });
        }

        let rows = rows_iter
            .map(|row| row.iter().map(cell_value).collect())
            .collect();

        debug!(sheet = %sheet_name, columns = headers.len(), "read worksheet");
        Ok(RawTable::new(headers, rows))
    }
}

fn cell_value(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(value) => text_cell(value),
        Data::Int(value) => Some(value.to_string()),
        Data::Float(value) => Some(float_cell(*value)),
        Data::Bool(value) => Some(value.to_string()),
        Data::Error(err) => {
            debug!(error = ?err, "treating spreadsheet error cell as blank");
            None
        }
        Data::DateTime(value) => match value.as_datetime() {
            Some(datetime) => Some(render_datetime(datetime)),
            None => Some(float_cell(value.as_f64())),
        },
        Data::DateTimeIso(value) => text_cell(value),
        Data::DurationIso(value) => text_cell(value),
    }
}

fn render_datetime(value: NaiveDateTime) -> String {
    if value.time() == chrono::NaiveTime::MIN {
        value.format("%Y-%m-%d").to_string()
    } else {
        value.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}
