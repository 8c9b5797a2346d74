use std::path::{Path, PathBuf};

use polars::prelude::*;
use signup_core::outputs::{
    build_output_frame, output_path, write_csv, write_outputs, MULTI_PLAN_COLUMN,
    QUARANTINE_REASON_COLUMN,
};
use signup_core::{classify, CleanupConfig, OutputFormat};
use signup_parser::{ColumnNames, RawTable, SignupTable};

fn table() -> SignupTable {
    let headers = vec![
        "name".to_string(),
        "email".to_string(),
        "signup_date".to_string(),
        "plan".to_string(),
        "is_multi_plan".to_string(),
    ];
    let row = |name: &str, email: &str, date: &str, plan: Option<&str>| {
        vec![
            Some(name.to_string()),
            Some(email.to_string()),
            Some(date.to_string()),
            plan.map(str::to_string),
            Some("stale".to_string()),
        ]
    };
    let rows = vec![
        row("Ada Lovelace", "ada@example.com", "01/01/2023", Some("basic")),
        row("Ada Lovelace", "ada@example.com", "June 15, 2023", Some("pro")),
        row("Grace Hopper", "grace@example.com", "2023-03-03", None),
        row("Alan Turing", "alan@example.com", "not-a-date", Some("basic")),
    ];
    SignupTable::from_raw(RawTable::new(headers, rows), &ColumnNames::default())
        .expect("schema should resolve")
}

#[test]
fn clean_frame_keeps_input_columns_and_appends_flag() -> PolarsResult<()> {
    let classified = classify(table(), &CleanupConfig::default());
    let df = build_output_frame(&classified.schema, &classified.clean, false)?;

    assert_eq!(
        df.get_column_names(),
        ["name", "email", "signup_date", "plan", MULTI_PLAN_COLUMN]
    );
    assert_eq!(df.height(), 2);

    let dates = df.column("signup_date")?.str()?;
    assert_eq!(dates.get(0), Some("2023-06-15"));
    assert_eq!(dates.get(1), Some("2023-03-03"));

    let plans = df.column("plan")?.str()?;
    assert_eq!(plans.get(0), Some("pro"));
    assert_eq!(plans.get(1), None);

    let flags = df.column(MULTI_PLAN_COLUMN)?.bool()?;
    assert_eq!(flags.get(0), Some(true));
    assert_eq!(flags.get(1), Some(false));
    Ok(())
}

#[test]
fn quarantine_frame_carries_reasons_and_blank_dates() -> PolarsResult<()> {
    let classified = classify(table(), &CleanupConfig::default());
    let df = build_output_frame(&classified.schema, &classified.quarantined, true)?;

    assert_eq!(
        df.get_column_names(),
        [
            "name",
            "email",
            "signup_date",
            "plan",
            MULTI_PLAN_COLUMN,
            QUARANTINE_REASON_COLUMN
        ]
    );
    assert_eq!(df.height(), 2);

    let dates = df.column("signup_date")?.str()?;
    assert_eq!(dates.get(0), Some("2023-01-01"));
    assert_eq!(dates.get(1), None);

    let reasons = df.column(QUARANTINE_REASON_COLUMN)?.str()?;
    assert_eq!(reasons.get(0), Some("duplicate email superseded by row 1"));
    assert_eq!(reasons.get(1), Some("unparseable signup date 'not-a-date'"));
    Ok(())
}

#[test]
fn csv_output_has_header_and_standardized_dates() -> PolarsResult<()> {
    let classified = classify(table(), &CleanupConfig::default());
    let mut df = build_output_frame(&classified.schema, &classified.clean, false)?;

    let mut buffer = Vec::new();
    write_csv(&mut df, &mut buffer)?;
    let text = String::from_utf8(buffer).expect("csv output is utf-8");
    let mut lines = text.lines();

    assert_eq!(
        lines.next(),
        Some("name,email,signup_date,plan,is_multi_plan")
    );
    assert_eq!(
        lines.next(),
        Some("Ada Lovelace,ada@example.com,2023-06-15,pro,true")
    );
    assert_eq!(
        lines.next(),
        Some("Grace Hopper,grace@example.com,2023-03-03,,false")
    );
    assert_eq!(lines.next(), None);
    Ok(())
}

#[test]
fn empty_partition_still_has_columns() -> PolarsResult<()> {
    let classified = classify(
        SignupTable::from_raw(
            RawTable::new(
                vec!["name".into(), "email".into(), "signup_date".into()],
                Vec::new(),
            ),
            &ColumnNames::default(),
        )
        .expect("schema should resolve"),
        &CleanupConfig::default(),
    );
    let df = build_output_frame(&classified.schema, &classified.clean, false)?;
    assert_eq!(df.height(), 0);
    assert_eq!(df.width(), 4);
    Ok(())
}

#[test]
fn parquet_output_swaps_csv_extension() {
    assert_eq!(
        output_path(Path::new("members_final.csv"), OutputFormat::Parquet),
        PathBuf::from("members_final.parquet")
    );
    assert_eq!(
        output_path(Path::new("members_final.csv"), OutputFormat::Csv),
        PathBuf::from("members_final.csv")
    );
    assert_eq!(
        output_path(Path::new("out/members.pq"), OutputFormat::Parquet),
        PathBuf::from("out/members.pq")
    );
}

#[test]
fn default_quarantine_table_keeps_the_input_layout() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut config = CleanupConfig::default();
    config.paths.clean_output = dir.path().join("members_final.csv");
    config.paths.quarantine_output = dir.path().join("quarantine.csv");

    let classified = classify(table(), &config);
    let artifacts = write_outputs(&classified, &config)?;
    assert_eq!(artifacts.quarantined_rows, 2);

    let quarantine = std::fs::read_to_string(&artifacts.quarantine_path)?;
    assert_eq!(
        quarantine.lines().next(),
        Some("name,email,signup_date,plan,is_multi_plan")
    );

    config.annotate_quarantine_reasons = true;
    write_outputs(&classified, &config)?;
    let annotated = std::fs::read_to_string(&artifacts.quarantine_path)?;
    assert_eq!(
        annotated.lines().next(),
        Some("name,email,signup_date,plan,is_multi_plan,quarantine_reason")
    );
    Ok(())
}
