// crates/signup-core/src/types.rs

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use signup_parser::{RequiredField, SignupRecord};

pub const STANDARDIZED_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum QuarantineReason {
    UnparseableDate { raw: Option<String> },
    /// `survivor_index` is the original row that kept the email, if any did.
    SupersededDuplicate { survivor_index: Option<usize> },
    InvalidEmail { email: Option<String> },
    SyntheticName { indicator: String },
    MissingRequiredField { field: RequiredField },
}

impl QuarantineReason {
    pub const CODES: [&'static str; 5] = [
        "unparseable_date",
        "superseded_duplicate",
        "invalid_email",
        "synthetic_name",
        "missing_required_field",
    ];

    pub fn code(&self) -> &'static str {
        match self {
            QuarantineReason::UnparseableDate { .. } => Self::CODES[0],
            QuarantineReason::SupersededDuplicate { .. } => Self::CODES[1],
            QuarantineReason::InvalidEmail { .. } => Self::CODES[2],
            QuarantineReason::SyntheticName { .. } => Self::CODES[3],
            QuarantineReason::MissingRequiredField { .. } => Self::CODES[4],
        }
    }
}

impl fmt::Display for QuarantineReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuarantineReason::UnparseableDate { raw: Some(raw) } => {
                write!(f, "unparseable signup date '{raw}'")
            }
            QuarantineReason::UnparseableDate { raw: None } => f.write_str("missing signup date"),
            QuarantineReason::SupersededDuplicate {
                survivor_index: Some(index),
            } => write!(f, "duplicate email superseded by row {index}"),
            QuarantineReason::SupersededDuplicate {
                survivor_index: None,
            } => f.write_str("duplicate email with no surviving signup"),
            QuarantineReason::InvalidEmail { email: Some(email) } => {
                write!(f, "invalid email '{email}'")
            }
            QuarantineReason::InvalidEmail { email: None } => f.write_str("missing email"),
            QuarantineReason::SyntheticName { indicator } => {
                write!(f, "name looks synthetic (contains '{indicator}')")
            }
            QuarantineReason::MissingRequiredField { field } => {
                write!(f, "required field '{field}' is blank")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordStatus {
    Clean,
    Quarantined(QuarantineReason),
}

/// A signup row plus everything the classification passes derive for it.
///
/// The status only moves from `Clean` to `Quarantined`; the first reason recorded wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedRecord {
    pub record: SignupRecord,
    pub signup_date_standardized: Option<NaiveDate>,
    pub is_multi_plan: bool,
    status: RecordStatus,
}

impl StagedRecord {
    pub fn new(record: SignupRecord) -> Self {
        Self {
            record,
            signup_date_standardized: None,
            is_multi_plan: false,
            status: RecordStatus::Clean,
        }
    }

    pub fn is_quarantined(&self) -> bool {
        matches!(self.status, RecordStatus::Quarantined(_))
    }

    pub fn quarantine_reason(&self) -> Option<&QuarantineReason> {
        match &self.status {
            RecordStatus::Clean => None,
            RecordStatus::Quarantined(reason) => Some(reason),
        }
    }

    pub fn original_index(&self) -> usize {
        self.record.original_index
    }

    pub fn quarantined(mut self, reason: QuarantineReason) -> Self {
        if let RecordStatus::Clean = self.status {
            self.status = RecordStatus::Quarantined(reason);
        }
        self
    }

    pub fn with_standardized_date(mut self, date: NaiveDate) -> Self {
        self.signup_date_standardized = Some(date);
        self
    }

    pub fn flagged_multi_plan(mut self) -> Self {
        self.is_multi_plan = true;
        self
    }

    pub fn standardized_date_string(&self) -> Option<String> {
        self.signup_date_standardized
            .map(|date| date.format(STANDARDIZED_DATE_FORMAT).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staged() -> StagedRecord {
        StagedRecord::new(SignupRecord::new(
            0,
            vec![Some("Ada".to_string()), Some("ada@example.com".to_string())],
        ))
    }

    #[test]
    fn first_quarantine_reason_wins() {
        let record = staged()
            .quarantined(QuarantineReason::InvalidEmail { email: None })
            .quarantined(QuarantineReason::SyntheticName {
                indicator: "test".to_string(),
            });

        assert_eq!(
            record.quarantine_reason(),
            Some(&QuarantineReason::InvalidEmail { email: None })
        );
    }

    #[test]
    fn standardized_date_renders_iso() {
        let record = staged().with_standardized_date(NaiveDate::from_ymd_opt(2023, 6, 5).unwrap());
        assert_eq!(record.standardized_date_string().as_deref(), Some("2023-06-05"));
    }

    #[test]
    fn reason_codes_are_stable() {
        let reason = QuarantineReason::MissingRequiredField {
            field: RequiredField::Name,
        };
        assert_eq!(reason.code(), "missing_required_field");
        assert_eq!(reason.to_string(), "required field 'name' is blank");
    }
}
