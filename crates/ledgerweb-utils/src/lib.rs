//! Utility functions and helpers

use serde_json::Value;

/// Lowercase an account name and replace spaces with underscores
pub fn account_slug(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

/// Read a finite number from a JSON value.
///
/// Accepts JSON numbers and strings holding a number ("12.5", " 40 "),
/// since form-driven clients often send amounts as text.
pub fn parse_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}
