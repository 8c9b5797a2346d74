/// Empty cells become `None`; anything else is kept verbatim so pass-through columns are not
/// altered on the way to the output tables.
pub fn text_cell(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

pub fn header_cell(value: &str) -> String {
    value.trim().trim_start_matches('\u{feff}').to_string()
}

/// Integral floats print without a trailing `.0` (spreadsheets store every number as f64).
pub fn float_cell(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
