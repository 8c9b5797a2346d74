use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::ReaderError;

/// The three columns every signup table must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredField {
    Name,
    Email,
    SignupDate,
}

impl RequiredField {
    pub const ALL: [RequiredField; 3] = [
        RequiredField::Name,
        RequiredField::Email,
        RequiredField::SignupDate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequiredField::Name => "name",
            RequiredField::Email => "email",
            RequiredField::SignupDate => "signup_date",
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header names used to locate the required fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub name: String,
    pub email: String,
    pub signup_date: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            name: RequiredField::Name.as_str().to_string(),
            email: RequiredField::Email.as_str().to_string(),
            signup_date: RequiredField::SignupDate.as_str().to_string(),
        }
    }
}

impl ColumnNames {
    pub fn get(&self, field: RequiredField) -> &str {
        match field {
            RequiredField::Name => &self.name,
            RequiredField::Email => &self.email,
            RequiredField::SignupDate => &self.signup_date,
        }
    }
}

/// Header plus rows exactly as a reader produced them. Blank cells are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    /// Pads short rows to the header width and drops rows with no values at all.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .filter(|row| row.iter().any(Option::is_some))
            .map(|mut row| {
                row.resize(width, None);
                row
            })
            .collect();
        Self { headers, rows }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupSchema {
    columns: Vec<String>,
    name: usize,
    email: usize,
    signup_date: usize,
}

impl SignupSchema {
    pub fn resolve(headers: Vec<String>, names: &ColumnNames) -> Result<Self, ReaderError> {
        let columns: Vec<String> = headers
            .into_iter()
            .enumerate()
            .map(|(idx, header)| {
                let trimmed = header.trim();
                if trimmed.is_empty() {
                    format!("unnamed_{idx}")
                } else {
                    trimmed.to_string()
                }
            })
            .collect();

        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(ReaderError::DuplicateColumn(column.clone()));
            }
        }

        let locate = |field: RequiredField| -> Result<usize, ReaderError> {
            let wanted = names.get(field);
            columns
                .iter()
                .position(|column| column == wanted)
                .ok_or_else(|| ReaderError::MissingColumn {
                    column: wanted.to_string(),
                    found: columns.clone(),
                })
        };

        Ok(Self {
            name: locate(RequiredField::Name)?,
            email: locate(RequiredField::Email)?,
            signup_date: locate(RequiredField::SignupDate)?,
            columns,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn index_of(&self, field: RequiredField) -> usize {
        match field {
            RequiredField::Name => self.name,
            RequiredField::Email => self.email,
            RequiredField::SignupDate => self.signup_date,
        }
    }

    pub fn column_name(&self, field: RequiredField) -> &str {
        &self.columns[self.index_of(field)]
    }

    pub fn field<'a>(&self, record: &'a SignupRecord, field: RequiredField) -> Option<&'a str> {
        record.value(self.index_of(field))
    }

    pub fn name<'a>(&self, record: &'a SignupRecord) -> Option<&'a str> {
        self.field(record, RequiredField::Name)
    }

    pub fn email<'a>(&self, record: &'a SignupRecord) -> Option<&'a str> {
        self.field(record, RequiredField::Email)
    }

    pub fn signup_date<'a>(&self, record: &'a SignupRecord) -> Option<&'a str> {
        self.field(record, RequiredField::SignupDate)
    }
}

/// One input row, keyed by its position in the source table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupRecord {
    pub original_index: usize,
    values: Vec<Option<String>>,
}

impl SignupRecord {
    pub fn new(original_index: usize, values: Vec<Option<String>>) -> Self {
        Self {
            original_index,
            values,
        }
    }

    pub fn value(&self, column: usize) -> Option<&str> {
        self.values.get(column).and_then(|value| value.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupTable {
    pub schema: SignupSchema,
    pub records: Vec<SignupRecord>,
}

impl SignupTable {
    pub fn from_raw(raw: RawTable, names: &ColumnNames) -> Result<Self, ReaderError> {
        let schema = SignupSchema::resolve(raw.headers, names)?;
        let records = raw
            .rows
            .into_iter()
            .enumerate()
            .map(|(idx, values)| SignupRecord::new(idx, values))
            .collect();
        Ok(Self { schema, records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
