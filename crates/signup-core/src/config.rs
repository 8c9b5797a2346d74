use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use signup_parser::ColumnNames;

use crate::error::{CleanupError, Result};

pub const DEFAULT_INPUT_PATH: &str = "signups.xls";
pub const DEFAULT_CLEAN_OUTPUT_PATH: &str = "members_final.csv";
pub const DEFAULT_QUARANTINE_OUTPUT_PATH: &str = "quarantine.csv";

/// Lowercased substrings that mark a name as test or placeholder data.
pub const DEFAULT_SYNTHETIC_NAME_INDICATORS: [&str; 6] =
    ["test", "dummy", "abc", "sample", "demo", "placeholder"];

/// How email cells are turned into duplicate-group keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailKeyMode {
    /// Exact cell value; `Ada@x.com` and `ada@x.com` are different users.
    #[default]
    Raw,
    /// Trimmed and lowercased.
    Normalized,
}

impl EmailKeyMode {
    /// Blank cells never form a group.
    pub fn key<'a>(&self, email: Option<&'a str>) -> Option<Cow<'a, str>> {
        let email = email?;
        match self {
            EmailKeyMode::Raw => Some(Cow::Borrowed(email)),
            EmailKeyMode::Normalized => {
                let normalized = email.trim().to_lowercase();
                if normalized.is_empty() {
                    None
                } else {
                    Some(Cow::Owned(normalized))
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Csv,
    Parquet,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Parquet => "parquet",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub input: PathBuf,
    pub clean_output: PathBuf,
    pub quarantine_output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT_PATH),
            clean_output: PathBuf::from(DEFAULT_CLEAN_OUTPUT_PATH),
            quarantine_output: PathBuf::from(DEFAULT_QUARANTINE_OUTPUT_PATH),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupConfig {
    pub columns: ColumnNames,
    pub email_key: EmailKeyMode,
    pub synthetic_name_indicators: Vec<String>,
    pub output_format: OutputFormat,
    /// Append a `quarantine_reason` column to the quarantine table. Off by default.
    pub annotate_quarantine_reasons: bool,
    pub paths: PathsConfig,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            columns: ColumnNames::default(),
            email_key: EmailKeyMode::default(),
            synthetic_name_indicators: DEFAULT_SYNTHETIC_NAME_INDICATORS
                .iter()
                .map(|indicator| indicator.to_string())
                .collect(),
            output_format: OutputFormat::default(),
            annotate_quarantine_reasons: false,
            paths: PathsConfig::default(),
        }
    }
}

impl CleanupConfig {
    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| CleanupError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| CleanupError::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}
