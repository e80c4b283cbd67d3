use serde_json::Value;

/// Yahoo is loose with its types; a price can arrive as `123.4`, `"123.4"`,
/// `null`, or not at all. `finite` handles all of them:
///
/// ```text
/// 123.4     -> Some(123.4)
/// " 12 "    -> Some(12.0)
/// "NaN"     -> None
/// null      -> None
/// true      -> None
/// ```
///
/// Only finite values make it through.
pub fn finite(value: Option<&Value>) -> Option<f64> {
    let num = match value? {
        Value::Number(num) => num.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    num.is_finite().then_some(num)
}

/// Same as [`finite`], falling back to `0.0`.
pub fn finite_or_zero(value: Option<&Value>) -> f64 {
    finite(value).unwrap_or(0.0)
}

/// Transform a `unix timestamp` -> `epoch millis`, e.g.,
///             `1705795200`     -> `1705795200000`
pub fn epoch_millis(value: &Value) -> Option<i64> {
    match value.as_i64() {
        Some(secs) => secs.checked_mul(1000),
        None => finite(Some(value)).map(|secs| (secs * 1000.0) as i64),
    }
}

/// Non-empty string content, or nothing.
pub fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value?.as_str().filter(|s| !s.trim().is_empty())
}
