// ── Cell formatting ──

use serde_json::Value;

use crate::model::parse_timestamp;

/// Placeholder for absent dates.
pub const NOT_AVAILABLE: &str = "N/A";

/// Shown when a date cell holds something that is not a date.
pub const INVALID_DATE: &str = "Invalid Date";

/// Whether a cell counts as empty: missing, `null`, `""`, `false` or `0`.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Render a date cell as `D Month YYYY` (UTC), e.g. `5 March 2024`.
pub fn format_date(value: &Value) -> String {
    if is_blank(value) {
        return NOT_AVAILABLE.to_owned();
    }
    parse_timestamp(value).map_or_else(
        || INVALID_DATE.to_owned(),
        |dt| dt.format("%-d %B %Y").to_string(),
    )
}

/// Plain text form of a cell value.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Milliseconds used to order date cells. Blank cells sort as the epoch;
/// unparseable ones have no position.
pub(crate) fn date_millis(value: &Value) -> Option<i64> {
    if is_blank(value) {
        return Some(0);
    }
    parse_timestamp(value).map(|dt| dt.timestamp_millis())
}
