//! Best-effort typing of scalar text: integer, then float, then boolean, then string.

use serde_json::{Number, Value};

const TRUE_SPELLINGS: [&str; 4] = ["y", "yes", "true", "on"];
const FALSE_SPELLINGS: [&str; 4] = ["n", "no", "false", "off"];

/// Convert scalar text with the first interpretation that succeeds.
///
/// The order is fixed: `"1"` always becomes an integer, `"1.5"` a float and
/// `"yes"` a boolean, whether or not the source quoted it.
pub fn coerce_scalar(text: &str) -> Value {
    if let Ok(integer) = text.parse::<i64>() {
        return Value::from(integer);
    }
    if let Some(number) = parse_float(text) {
        return Value::Number(number);
    }
    if let Some(boolean) = parse_bool(text) {
        return Value::Bool(boolean);
    }
    Value::String(text.to_string())
}

fn parse_float(text: &str) -> Option<Number> {
    // `inf` and `NaN` parse as f64 but are words here, and JSON has no encoding for them.
    let value = text.parse::<f64>().ok().filter(|value| value.is_finite())?;
    Number::from_f64(value)
}

/// Accepts each spelling in lower case, Capitalized or UPPER case.
pub fn parse_bool(text: &str) -> Option<bool> {
    let matches = |spellings: &[&str]| {
        spellings.iter().any(|spelling| {
            text == *spelling || text == spelling.to_uppercase() || text == capitalize(spelling)
        })
    };
    if matches(&TRUE_SPELLINGS) {
        Some(true)
    } else if matches(&FALSE_SPELLINGS) {
        Some(false)
    } else {
        None
    }
}

fn capitalize(word: &str) -> String {
    let mut characters = word.chars();
    match characters.next() {
        Some(first) => first.to_uppercase().chain(characters).collect(),
        None => String::new(),
    }
}
