pub mod errors;
pub mod formats;
pub mod model;
mod registry;

pub use errors::{ReaderAttempt, ReaderError};
pub use formats::{CsvTableReader, ExcelTableReader};
pub use model::{
    ColumnNames, RawTable, RequiredField, SignupRecord, SignupSchema, SignupTable,
};
pub use registry::{read_signup_table, read_with_readers, TableReader};
