use signup_core::dates::standardize_dates;
use signup_core::validation::{
    is_valid_email, EmailShapeRule, RecordRule, RequiredFieldsRule, SyntheticNameRule, Validator,
};
use signup_core::{CleanupConfig, QuarantineReason, StagedRecord};
use signup_parser::{ColumnNames, RawTable, RequiredField, SignupSchema, SignupTable};

fn cell(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn staged(rows: &[(&str, &str, &str)]) -> (SignupSchema, Vec<StagedRecord>) {
    let headers = vec!["name".into(), "email".into(), "signup_date".into()];
    let rows = rows
        .iter()
        .map(|(name, email, date)| vec![cell(name), cell(email), cell(date)])
        .collect();
    let table = SignupTable::from_raw(RawTable::new(headers, rows), &ColumnNames::default())
        .expect("schema should resolve");
    let records = standardize_dates(table.records, &table.schema);
    (table.schema, records)
}

#[test]
fn email_shape_requires_at_and_dotted_domain() {
    assert!(is_valid_email("ada@example.com"));
    assert!(is_valid_email("  ADA@Example.COM "));
    assert!(is_valid_email("a@b.c"));

    assert!(!is_valid_email("not-an-email"));
    assert!(!is_valid_email("ada@localhost"));
    assert!(!is_valid_email(""));
    assert!(!is_valid_email("   "));
}

#[test]
fn email_rule_reports_the_offending_value() {
    let (schema, records) = staged(&[("Ada", "not-an-email", "2023-01-01"), ("Ada", "", "2023-01-01")]);

    assert_eq!(
        EmailShapeRule.check(&records[0], &schema),
        Some(QuarantineReason::InvalidEmail {
            email: Some("not-an-email".to_string())
        })
    );
    assert_eq!(
        EmailShapeRule.check(&records[1], &schema),
        Some(QuarantineReason::InvalidEmail { email: None })
    );
}

#[test]
fn synthetic_names_match_case_insensitive_substrings() {
    let rule = SyntheticNameRule::new(["test", "dummy", "abc", "sample", "demo", "placeholder"]);

    assert_eq!(rule.matching_indicator("Test User"), Some("test"));
    assert_eq!(rule.matching_indicator("ABC Corp"), Some("abc"));
    assert_eq!(rule.matching_indicator("Sam Demoulin"), Some("demo"));
    assert_eq!(rule.matching_indicator("Placeholder"), Some("placeholder"));
    assert_eq!(rule.matching_indicator("Ada Lovelace"), None);
}

#[test]
fn required_fields_rule_names_the_blank_field() {
    let (schema, records) = staged(&[
        ("", "ada@example.com", "2023-01-01"),
        ("   ", "ada@example.com", "2023-01-01"),
        ("Ada", "ada@example.com", "2023-01-01"),
    ]);

    let expected = Some(QuarantineReason::MissingRequiredField {
        field: RequiredField::Name,
    });
    assert_eq!(RequiredFieldsRule.check(&records[0], &schema), expected);
    assert_eq!(RequiredFieldsRule.check(&records[1], &schema), expected);
    assert_eq!(RequiredFieldsRule.check(&records[2], &schema), None);
}

#[test]
fn checks_short_circuit_in_fixed_order() {
    // Bad email and synthetic name: the email check wins.
    let (schema, records) = staged(&[
        ("Test User", "not-an-email", "2023-01-01"),
        ("Test User", "ada@example.com", "2023-01-01"),
        ("", "ada@example.com", "2023-01-01"),
        ("Ada Lovelace", "ada@example.com", "2023-01-01"),
    ]);
    let validated = Validator::default().apply(records, &schema);

    assert!(matches!(
        validated[0].quarantine_reason(),
        Some(QuarantineReason::InvalidEmail { .. })
    ));
    assert_eq!(
        validated[1].quarantine_reason(),
        Some(&QuarantineReason::SyntheticName {
            indicator: "test".to_string()
        })
    );
    assert_eq!(
        validated[2].quarantine_reason(),
        Some(&QuarantineReason::MissingRequiredField {
            field: RequiredField::Name
        })
    );
    assert!(!validated[3].is_quarantined());
}

#[test]
fn already_quarantined_records_keep_their_reason() {
    let (schema, records) = staged(&[("Test User", "not-an-email", "not-a-date")]);
    let validated = Validator::default().apply(records, &schema);

    assert_eq!(
        validated[0].quarantine_reason(),
        Some(&QuarantineReason::UnparseableDate {
            raw: Some("not-a-date".to_string())
        })
    );
}

#[test]
fn custom_blocklist_replaces_the_default() {
    let config = CleanupConfig {
        synthetic_name_indicators: vec!["Bot".to_string()],
        ..CleanupConfig::default()
    };
    let (schema, records) = staged(&[
        ("Test User", "ada@example.com", "2023-01-01"),
        ("Chatbot", "bot@example.com", "2023-01-01"),
    ]);
    let validated = Validator::from_config(&config).apply(records, &schema);

    assert!(!validated[0].is_quarantined());
    assert_eq!(
        validated[1].quarantine_reason(),
        Some(&QuarantineReason::SyntheticName {
            indicator: "bot".to_string()
        })
    );
}
