use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Serialize;
use signup_parser::{read_signup_table, RequiredField, SignupSchema, SignupTable};
use tracing::{error, info, warn};

use crate::config::CleanupConfig;
use crate::dates::standardize_dates;
use crate::dedup::resolve_duplicates;
use crate::error::{CleanupError, Result};
use crate::types::{QuarantineReason, StagedRecord};
use crate::validation::Validator;

/// Counts reported at the end of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanupSummary {
    pub total_rows: usize,
    pub clean_rows: usize,
    pub quarantined_rows: usize,
    pub multi_plan_rows: usize,
    /// Clean rows over total rows; 0 for an empty input.
    pub quality_rate: f64,
    pub quarantine_reasons: BTreeMap<&'static str, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_hash: Option<String>,
}

impl CleanupSummary {
    fn from_partitions(clean: &[StagedRecord], quarantined: &[StagedRecord]) -> Self {
        let total_rows = clean.len() + quarantined.len();
        let mut quarantine_reasons: BTreeMap<&'static str, usize> = QuarantineReason::CODES
            .iter()
            .map(|code| (*code, 0usize))
            .collect();
        for staged in quarantined {
            if let Some(reason) = staged.quarantine_reason() {
                *quarantine_reasons.entry(reason.code()).or_insert(0) += 1;
            }
        }

        Self {
            total_rows,
            clean_rows: clean.len(),
            quarantined_rows: quarantined.len(),
            multi_plan_rows: clean.iter().filter(|staged| staged.is_multi_plan).count(),
            quality_rate: if total_rows == 0 {
                0.0
            } else {
                clean.len() as f64 / total_rows as f64
            },
            quarantine_reasons,
            input_hash: None,
        }
    }

    pub fn quality_percent(&self) -> f64 {
        self.quality_rate * 100.0
    }
}

/// Result of classifying one table: both partitions in original row order plus the summary.
#[derive(Debug, Clone)]
pub struct ClassifiedSignups {
    pub schema: SignupSchema,
    pub clean: Vec<StagedRecord>,
    pub quarantined: Vec<StagedRecord>,
    pub summary: CleanupSummary,
}

/// Runs the three passes (dates, duplicates, validation) and partitions the result.
pub fn classify(table: SignupTable, config: &CleanupConfig) -> ClassifiedSignups {
    let SignupTable { schema, records } = table;
    let total_rows = records.len();

    let staged = standardize_dates(records, &schema);
    let staged = resolve_duplicates(staged, &schema, config.email_key);
    let staged = Validator::from_config(config).apply(staged, &schema);

    let classified = partition(schema, staged);
    if classified.summary.total_rows != total_rows {
        error!(
            expected = total_rows,
            found = classified.summary.total_rows,
            "partition row count drifted from input"
        );
    }
    classified
}

/// Splits staged records into clean and quarantined tables. A clean record without a
/// standardized date cannot be published, so it is quarantined instead of dropped.
pub fn partition(schema: SignupSchema, staged: Vec<StagedRecord>) -> ClassifiedSignups {
    let mut clean = Vec::new();
    let mut quarantined = Vec::new();

    for record in staged {
        if record.is_quarantined() {
            quarantined.push(record);
        } else if record.signup_date_standardized.is_some() {
            clean.push(record);
        } else {
            warn!(
                row = record.original_index(),
                "clean record has no standardized date; quarantining"
            );
            quarantined.push(record.quarantined(QuarantineReason::MissingRequiredField {
                field: RequiredField::SignupDate,
            }));
        }
    }

    let summary = CleanupSummary::from_partitions(&clean, &quarantined);
    info!(
        total = summary.total_rows,
        clean = summary.clean_rows,
        quarantined = summary.quarantined_rows,
        multi_plan = summary.multi_plan_rows,
        "partitioned signup records"
    );

    ClassifiedSignups {
        schema,
        clean,
        quarantined,
        summary,
    }
}

/// Reads the configured input table and classifies it. The summary carries the input's
/// blake3 hash.
pub fn run_classification(config: &CleanupConfig) -> Result<ClassifiedSignups> {
    let input = config.paths.input.as_path();
    info!(input = %input.display(), "reading signup table");

    let table = read_signup_table(input, &config.columns)?;
    info!(
        rows = table.len(),
        columns = ?table.schema.columns(),
        "loaded signup table"
    );

    let input_hash = hash_file(input)?;
    let mut classified = classify(table, config);
    classified.summary.input_hash = Some(input_hash);
    Ok(classified)
}

pub fn hash_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|source| CleanupError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}
