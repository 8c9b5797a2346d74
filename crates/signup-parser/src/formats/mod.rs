mod common;
mod csv_table;
mod excel;

pub use csv_table::CsvTableReader;
pub use excel::ExcelTableReader;

pub(crate) use common::{float_cell, header_cell, text_cell};
