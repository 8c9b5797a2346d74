use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use signup_parser::{SignupRecord, SignupSchema};
use tracing::{debug, info};

use crate::types::{QuarantineReason, StagedRecord};

// Within a layout the two-digit-year pattern comes before the four-digit one.
// Month-first patterns precede day-first ones, so "03/04/2023" is March 4th and
// day-first only applies when the leading number cannot be a month.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%y",
    "%m-%d-%y",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%m.%d.%Y",
    "%d/%m/%y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%B %d,%Y",
    "%B. %d, %Y",
    "%d %B %Y",
    "%d %B, %Y",
    "%d-%B-%Y",
    "%d-%B-%y",
    "%d/%B/%Y",
    "%B-%d-%Y",
    "%Y-%B-%d",
    "%Y %B %d",
    "%A, %B %d, %Y",
    "%A %B %d %Y",
    "%A, %d %B %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%y %H:%M:%S",
    "%m/%d/%y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%B %d, %Y %H:%M:%S",
    "%B %d, %Y %I:%M %p",
];

// Year and month only. The day defaults to the 1st: candidates get " 1" appended and these
// layouts end in " %d".
const MONTH_FORMATS: &[&str] = &[
    "%Y-%m %d",
    "%Y/%m %d",
    "%m/%Y %d",
    "%B %Y %d",
    "%B, %Y %d",
    "%Y %B %d",
];

/// Zone names that carry no offset beyond UTC.
const UTC_ZONE_SUFFIXES: &[&str] = &["UTC", "GMT", "Z"];

const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
];

/// Parses a signup date written in any of the common calendar layouts.
///
/// Date-times keep the calendar date they were written in, even when they carry an offset.
pub fn parse_signup_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(date) = parse_compact(trimmed) {
        return Some(date);
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(datetime.date_naive());
    }
    if let Ok(datetime) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(datetime.date_naive());
    }

    let cleaned = normalize_month_names(&strip_ordinal_suffixes(trimmed));
    let candidate = strip_utc_suffix(&cleaned);

    DATE_FORMATS
        .iter()
        .filter_map(|format| NaiveDate::parse_from_str(candidate, format).ok())
        .find(is_plausible)
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .filter_map(|format| NaiveDateTime::parse_from_str(candidate, format).ok())
                .map(|datetime| datetime.date())
                .find(is_plausible)
        })
        .or_else(|| {
            OFFSET_DATETIME_FORMATS
                .iter()
                .filter_map(|format| DateTime::parse_from_str(candidate, format).ok())
                .map(|datetime| datetime.date_naive())
                .find(is_plausible)
        })
        .or_else(|| {
            let padded = format!("{candidate} 1");
            MONTH_FORMATS
                .iter()
                .filter_map(|format| NaiveDate::parse_from_str(&padded, format).ok())
                .find(is_plausible)
        })
}

/// `%Y` accepts one to four digits, so "12-01-23" would otherwise read as the year 12.
fn is_plausible(date: &NaiveDate) -> bool {
    date.year() >= 1000
}

/// Date standardization pass: every record gets either a standardized date or an
/// `UnparseableDate` quarantine.
pub fn standardize_dates(records: Vec<SignupRecord>, schema: &SignupSchema) -> Vec<StagedRecord> {
    let staged: Vec<StagedRecord> = records
        .into_iter()
        .map(|record| standardize_record(record, schema))
        .collect();

    let failures = staged.iter().filter(|record| record.is_quarantined()).count();
    info!(
        records = staged.len(),
        unparseable = failures,
        "standardized signup dates"
    );
    staged
}

fn standardize_record(record: SignupRecord, schema: &SignupSchema) -> StagedRecord {
    let raw = schema.signup_date(&record).map(str::to_string);
    let parsed = raw.as_deref().and_then(parse_signup_date);
    let staged = StagedRecord::new(record);

    match parsed {
        Some(date) => staged.with_standardized_date(date),
        None => {
            debug!(
                row = staged.original_index(),
                raw = raw.as_deref().unwrap_or(""),
                "signup date could not be parsed"
            );
            staged.quarantined(QuarantineReason::UnparseableDate { raw })
        }
    }
}

/// `20230115` style dates. Only exact eight-digit strings qualify.
fn parse_compact(value: &str) -> Option<NaiveDate> {
    if value.len() == 8 && value.bytes().all(|byte| byte.is_ascii_digit()) {
        NaiveDate::parse_from_str(value, "%Y%m%d").ok()
    } else {
        None
    }
}

/// "Sept" is the one common month abbreviation chrono does not know.
fn normalize_month_names(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut word = String::new();

    let flush = |word: &mut String, out: &mut String| {
        if word.eq_ignore_ascii_case("sept") {
            out.push_str(&word[..3]);
        } else {
            out.push_str(word);
        }
        word.clear();
    };

    for ch in value.chars() {
        if ch.is_alphabetic() {
            word.push(ch);
        } else {
            flush(&mut word, &mut out);
            out.push(ch);
        }
    }
    flush(&mut word, &mut out);
    out
}

/// Removes a trailing `UTC`, `GMT` or `Z` that follows a time, leaving the wall-clock text.
fn strip_utc_suffix(value: &str) -> &str {
    for suffix in UTC_ZONE_SUFFIXES {
        let Some(split) = value.len().checked_sub(suffix.len()) else {
            continue;
        };
        if !value.is_char_boundary(split) || !value[split..].eq_ignore_ascii_case(suffix) {
            continue;
        }
        let head = &value[..split];
        if head.ends_with(|ch: char| ch.is_ascii_digit() || ch.is_whitespace()) {
            return head.trim_end();
        }
    }
    value
}

/// Drops `st`/`nd`/`rd`/`th` directly after a digit ("June 1st" -> "June 1").
fn strip_ordinal_suffixes(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let mut out = String::with_capacity(value.len());
    let mut idx = 0;

    while idx < chars.len() {
        let ch = chars[idx];
        out.push(ch);
        idx += 1;

        if ch.is_ascii_digit() && idx < chars.len() {
            let suffix: String = chars
                .iter()
                .skip(idx)
                .take(2)
                .collect::<String>()
                .to_ascii_lowercase();
            let after = chars.get(idx + 2);
            let is_suffix = matches!(suffix.as_str(), "st" | "nd" | "rd" | "th")
                && after.map_or(true, |next| !next.is_alphabetic());
            if is_suffix {
                idx += 2;
            }
        }
    }

    out
}
