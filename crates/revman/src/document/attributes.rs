//! Attribute name and value normalisation
//!
//! RevMan uses SCREAMING_SNAKE names and stores every value as a string.
//! The JSON model uses camelCase keys and real numbers where a value is
//! unambiguously numeric.

use serde_json::{Number, Value};

/// Convert `STUDY_ID` style names to `studyId`.
pub fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (index, part) in name.split(['_', '-']).filter(|p| !p.is_empty()).enumerate() {
        let lower = part.to_lowercase();
        if index == 0 {
            out.push_str(&lower);
        } else {
            let mut chars = lower.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
        }
    }
    out
}

/// camelCase a name, renaming it when it would shadow a typed field.
///
/// `STUDIES` on an outcome becomes `declaredStudies` because `studies` holds
/// the data rows.
pub fn attribute_key(name: &str, reserved: &[&str]) -> String {
    let key = camel_case(name);
    if reserved.contains(&key.as_str()) {
        let mut chars = key.chars();
        match chars.next() {
            Some(first) => format!("declared{}{}", first.to_uppercase(), chars.as_str()),
            None => key,
        }
    } else {
        key
    }
}

/// Turn an attribute string into a JSON value.
///
/// Integers and finite decimals become numbers only when the number prints
/// back as the exact same text. Leading zeros (`"007"`), trailing zeros
/// (`"0.50"`) and values too long to represent stay strings, so identifiers
/// survive untouched.
pub fn coerce_value(raw: &str) -> Value {
    if is_plain_number(raw) {
        let number = raw
            .parse::<i64>()
            .ok()
            .map(Number::from)
            .or_else(|| raw.parse::<u64>().ok().map(Number::from))
            .or_else(|| raw.parse::<f64>().ok().and_then(Number::from_f64));
        if let Some(n) = number.filter(|n| n.to_string() == raw) {
            return Value::Number(n);
        }
    }
    Value::String(raw.to_string())
}

fn is_plain_number(raw: &str) -> bool {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };
    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    if int_part.len() > 1 && int_part.starts_with('0') {
        return false;
    }
    match frac_part {
        Some(f) => !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit()),
        None => true,
    }
}
