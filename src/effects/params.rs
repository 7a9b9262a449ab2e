//! Parameter value coercion
//!
//! UIs and hand-edited documents hand over numbers in whatever shape they
//! have (JSON numbers, numeric strings). Coercion happens here, per key.

use serde_json::Value;

use crate::error::{AugError, Result};

/// Coerce a JSON value to a float
///
/// Accepts numbers and numeric strings.
pub fn coerce_f64(name: &str, value: &Value) -> Result<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(AugError::invalid_param(
            name,
            format!("expected a number, got {}", value),
        )),
    }
}

/// Coerce a JSON value to an integer
///
/// Accepts integers, floats (truncated toward zero) and integer or float
/// strings.
pub fn coerce_i64(name: &str, value: &Value) -> Result<i64> {
    if let Some(v) = value.as_i64() {
        return Ok(v);
    }
    if let Value::String(s) = value {
        if let Ok(v) = s.trim().parse::<i64>() {
            return Ok(v);
        }
    }
    let float = coerce_f64(name, value).map_err(|_| {
        AugError::invalid_param(name, format!("expected an integer, got {}", value))
    })?;
    if float.abs() > i64::MAX as f64 {
        return Err(AugError::invalid_param(
            name,
            format!("{} is out of integer range", float),
        ));
    }
    Ok(float.trunc() as i64)
}
