use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use polars::prelude::*;
use signup_parser::{RequiredField, SignupSchema};
use tracing::info;

use crate::config::{CleanupConfig, OutputFormat};
use crate::error::{CleanupError, Result};
use crate::pipelines::{ClassifiedSignups, CleanupSummary};
use crate::types::StagedRecord;

pub const MULTI_PLAN_COLUMN: &str = "is_multi_plan";
pub const QUARANTINE_REASON_COLUMN: &str = "quarantine_reason";

/// Where the partitions ended up after a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArtifacts {
    pub clean_path: PathBuf,
    pub quarantine_path: PathBuf,
    pub clean_rows: usize,
    pub quarantined_rows: usize,
}

/// Builds the output frame for one partition: input columns in their original order with the
/// date column holding the standardized date, then `is_multi_plan`, then optionally the
/// quarantine reason.
pub fn build_output_frame(
    schema: &SignupSchema,
    records: &[StagedRecord],
    include_reason: bool,
) -> PolarsResult<DataFrame> {
    let date_index = schema.index_of(RequiredField::SignupDate);
    let mut columns: Vec<Column> = Vec::with_capacity(schema.len() + 2);

    for (idx, name) in schema.columns().iter().enumerate() {
        let derived =
            name == MULTI_PLAN_COLUMN || (include_reason && name == QUARANTINE_REASON_COLUMN);
        if derived {
            continue;
        }

        let values: Vec<Option<String>> = if idx == date_index {
            records
                .iter()
                .map(StagedRecord::standardized_date_string)
                .collect()
        } else {
            records
                .iter()
                .map(|staged| staged.record.value(idx).map(str::to_string))
                .collect()
        };
        columns.push(Series::new(name.as_str().into(), values).into());
    }

    let multi_plan: Vec<bool> = records.iter().map(|staged| staged.is_multi_plan).collect();
    columns.push(Series::new(MULTI_PLAN_COLUMN.into(), multi_plan).into());

    if include_reason {
        let reasons: Vec<Option<String>> = records
            .iter()
            .map(|staged| staged.quarantine_reason().map(|reason| reason.to_string()))
            .collect();
        columns.push(Series::new(QUARANTINE_REASON_COLUMN.into(), reasons).into());
    }

    DataFrame::new(columns)
}

pub fn write_csv<W: Write>(df: &mut DataFrame, writer: W) -> PolarsResult<()> {
    CsvWriter::new(writer).include_header(true).finish(df)
}

pub fn write_frame(df: &mut DataFrame, path: &Path, format: OutputFormat) -> Result<()> {
    let file = File::create(path).map_err(|source| CleanupError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match format {
        OutputFormat::Csv => write_csv(df, file)?,
        OutputFormat::Parquet => {
            ParquetWriter::new(file)
                .with_compression(ParquetCompression::Zstd(None))
                .finish(df)?;
        }
    }
    Ok(())
}

/// Parquet output written to a `.csv` path gets its extension swapped.
pub fn output_path(path: &Path, format: OutputFormat) -> PathBuf {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    match format {
        OutputFormat::Parquet if is_csv => path.with_extension("parquet"),
        _ => path.to_path_buf(),
    }
}

pub fn write_outputs(
    classified: &ClassifiedSignups,
    config: &CleanupConfig,
) -> Result<OutputArtifacts> {
    let format = config.output_format;
    let clean_path = output_path(&config.paths.clean_output, format);
    let quarantine_path = output_path(&config.paths.quarantine_output, format);

    let mut clean_df = build_output_frame(&classified.schema, &classified.clean, false)?;
    write_frame(&mut clean_df, &clean_path, format)?;
    info!(
        path = %clean_path.display(),
        rows = clean_df.height(),
        format = %format,
        "wrote clean records"
    );

    let mut quarantine_df = build_output_frame(
        &classified.schema,
        &classified.quarantined,
        config.annotate_quarantine_reasons,
    )?;
    write_frame(&mut quarantine_df, &quarantine_path, format)?;
    info!(
        path = %quarantine_path.display(),
        rows = quarantine_df.height(),
        format = %format,
        "wrote quarantined records"
    );

    Ok(OutputArtifacts {
        clean_path,
        quarantine_path,
        clean_rows: clean_df.height(),
        quarantined_rows: quarantine_df.height(),
    })
}

pub fn write_summary_json(summary: &CleanupSummary, path: &Path) -> Result<()> {
    let json = serde_json::to_vec_pretty(summary)?;
    std::fs::write(path, json).map_err(|source| CleanupError::Io {
        path: path.to_path_buf(),
        source,
    })
}
