use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Number, Value};

/// One element of the cartesian product: field name to a single value, in
/// field order.
pub type Variation = serde_json::Map<String, Value>;

/// Per-call input: field name to a scalar or a list of candidate scalars.
pub type InputData = serde_json::Map<String, Value>;

/// Returns true for null and the empty string.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        _ => false,
    }
}

/// Numeric reading of a value, accepting numbers and numeric strings.
///
/// Strings may carry surrounding whitespace, a sign, a fractional part and an
/// exponent. Booleans, null and lists are never numeric.
pub fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => {
            let trimmed = trim_numeric_whitespace(text);
            if numeric_pattern()?.is_match(trimmed) {
                trimmed.parse::<f64>().ok()
            } else {
                None
            }
        }
        _ => None,
    }
}

pub fn is_numeric(value: &Value) -> bool {
    to_number(value).is_some()
}

/// Reads the leading numeric prefix of a rule parameter, falling back to 0.
///
/// `"1000"` reads as 1000, `"12abc"` as 12 and `"abc"` as 0.
pub fn leading_number(text: &str) -> f64 {
    let trimmed = text.trim_start_matches(is_numeric_whitespace);
    leading_number_pattern()
        .and_then(|pattern| pattern.find(trimmed))
        .and_then(|found| found.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Returns true when the whole text is a number in the same notation accepted
/// by [`to_number`].
pub fn is_numeric_text(text: &str) -> bool {
    to_number(&Value::String(text.to_string())).is_some()
}

/// Parses a canonical integer string: optional sign, no leading zeros,
/// surrounding whitespace allowed.
pub fn parse_canonical_int(text: &str) -> Option<i64> {
    let trimmed = trim_numeric_whitespace(text);
    if canonical_int_pattern()?.is_match(trimmed) {
        trimmed.parse::<i64>().ok()
    } else {
        None
    }
}

/// String form used by rules and templates.
///
/// Null and `false` render empty, `true` renders `1`, integral floats drop
/// their fractional part and lists join their elements with `,`.
pub fn to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => String::new(),
        Value::Number(number) => number_text(number),
        Value::String(text) => text.clone(),
        Value::Array(items) => items.iter().map(to_text).collect::<Vec<_>>().join(","),
        Value::Object(map) => map.values().map(to_text).collect::<Vec<_>>().join(","),
    }
}

/// String form of a scalar; lists and objects have none.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Array(_) | Value::Object(_) => None,
        other => Some(to_text(other)),
    }
}

fn number_text(number: &Number) -> String {
    if number.is_i64() || number.is_u64() {
        return number.to_string();
    }
    match number.as_f64() {
        Some(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
            format!("{}", value as i64)
        }
        Some(value) => value.to_string(),
        None => number.to_string(),
    }
}

fn is_numeric_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r' | '\u{0B}' | '\u{0C}')
}

fn trim_numeric_whitespace(text: &str) -> &str {
    text.trim_matches(is_numeric_whitespace)
}

fn numeric_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?$").ok())
        .as_ref()
}

fn leading_number_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?").ok())
        .as_ref()
}

fn canonical_int_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[+-]?(0|[1-9]\d*)$").ok())
        .as_ref()
}
