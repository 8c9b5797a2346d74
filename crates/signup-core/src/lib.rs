pub mod config;
pub mod dates;
pub mod dedup;
pub mod error;
pub mod outputs;
pub mod pipelines;
pub mod types;
pub mod validation;

pub use config::{CleanupConfig, EmailKeyMode, OutputFormat};
pub use error::{CleanupError, Result};
pub use pipelines::{classify, run_classification, ClassifiedSignups, CleanupSummary};
pub use types::{QuarantineReason, RecordStatus, StagedRecord};
