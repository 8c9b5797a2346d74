// crates/signup-core/src/validation.rs

use signup_parser::{RequiredField, SignupSchema};
use tracing::{debug, info};

use crate::config::CleanupConfig;
use crate::types::{QuarantineReason, StagedRecord};

/// One content check. Returning `Some` quarantines the record.
pub trait RecordRule {
    fn name(&self) -> &'static str;
    fn check(&self, staged: &StagedRecord, schema: &SignupSchema) -> Option<QuarantineReason>;
}

// --- Email shape ---
pub struct EmailShapeRule;

impl RecordRule for EmailShapeRule {
    fn name(&self) -> &'static str {
        "email_shape"
    }

    fn check(&self, staged: &StagedRecord, schema: &SignupSchema) -> Option<QuarantineReason> {
        let email = schema.email(&staged.record);
        if email.is_some_and(is_valid_email) {
            None
        } else {
            Some(QuarantineReason::InvalidEmail {
                email: email.map(str::to_string),
            })
        }
    }
}

/// Structural check only: something before and after an `@`, and a dot somewhere in the
/// domain. Single-label domains such as `user@localhost` are rejected.
pub fn is_valid_email(email: &str) -> bool {
    let normalized = email.trim().to_lowercase();
    if normalized.is_empty() {
        return false;
    }
    match normalized.split_once('@') {
        Some((_, domain)) => domain.contains('.'),
        None => false,
    }
}

// --- Synthetic names ---
pub struct SyntheticNameRule {
    indicators: Vec<String>,
}

impl SyntheticNameRule {
    pub fn new<I, S>(indicators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            indicators: indicators
                .into_iter()
                .map(|indicator| indicator.as_ref().trim().to_lowercase())
                .filter(|indicator| !indicator.is_empty())
                .collect(),
        }
    }

    /// First blocklisted substring found in `name`, compared case-insensitively.
    pub fn matching_indicator(&self, name: &str) -> Option<&str> {
        let lowered = name.trim().to_lowercase();
        self.indicators
            .iter()
            .find(|indicator| lowered.contains(indicator.as_str()))
            .map(String::as_str)
    }
}

impl RecordRule for SyntheticNameRule {
    fn name(&self) -> &'static str {
        "synthetic_name"
    }

    fn check(&self, staged: &StagedRecord, schema: &SignupSchema) -> Option<QuarantineReason> {
        let name = schema.name(&staged.record)?;
        self.matching_indicator(name)
            .map(|indicator| QuarantineReason::SyntheticName {
                indicator: indicator.to_string(),
            })
    }
}

// --- Required fields ---
pub struct RequiredFieldsRule;

impl RecordRule for RequiredFieldsRule {
    fn name(&self) -> &'static str {
        "required_fields"
    }

    fn check(&self, staged: &StagedRecord, schema: &SignupSchema) -> Option<QuarantineReason> {
        RequiredField::ALL
            .into_iter()
            .find(|field| {
                let present = match field {
                    RequiredField::SignupDate => staged.signup_date_standardized.is_some(),
                    other => schema
                        .field(&staged.record, *other)
                        .is_some_and(|value| !value.trim().is_empty()),
                };
                !present
            })
            .map(|field| QuarantineReason::MissingRequiredField { field })
    }
}

/// Ordered rule set. A record stops at the first rule it fails.
pub struct Validator {
    rules: Vec<Box<dyn RecordRule>>,
}

impl Validator {
    pub fn new(rules: Vec<Box<dyn RecordRule>>) -> Self {
        Self { rules }
    }

    pub fn from_config(config: &CleanupConfig) -> Self {
        Self::new(vec![
            Box::new(EmailShapeRule),
            Box::new(SyntheticNameRule::new(&config.synthetic_name_indicators)),
            Box::new(RequiredFieldsRule),
        ])
    }

    pub fn check(&self, staged: &StagedRecord, schema: &SignupSchema) -> Option<QuarantineReason> {
        self.rules.iter().find_map(|rule| {
            let reason = rule.check(staged, schema)?;
            debug!(
                row = staged.original_index(),
                rule = rule.name(),
                reason = %reason,
                "record failed validation"
            );
            Some(reason)
        })
    }

    /// Validation pass. Records already quarantined are passed through untouched.
    pub fn apply(&self, records: Vec<StagedRecord>, schema: &SignupSchema) -> Vec<StagedRecord> {
        let mut failed = 0usize;
        let validated: Vec<StagedRecord> = records
            .into_iter()
            .map(|staged| {
                if staged.is_quarantined() {
                    return staged;
                }
                match self.check(&staged, schema) {
                    Some(reason) => {
                        failed += 1;
                        staged.quarantined(reason)
                    }
                    None => staged,
                }
            })
            .collect();

        info!(failed, "validated signup records");
        validated
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::from_config(&CleanupConfig::default())
    }
}
