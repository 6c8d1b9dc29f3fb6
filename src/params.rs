//! Named parameter lookup for transforms and effects.
//!
//! Parameters are read once, when a filter is parsed or an effect is prepared, and captured into
//! typed snapshots. Nothing downstream re-reads a [`ParamSource`].

use crate::foundation::error::{MediaLabError, MediaLabResult};

/// Synchronous source of named numeric, string and boolean configuration values.
pub trait ParamSource {
    /// Look up a numeric value.
    fn number(&self, name: &str) -> Option<f64>;
    /// Look up a string value.
    fn text(&self, name: &str) -> Option<String>;
    /// Look up a boolean value.
    fn flag(&self, name: &str) -> Option<bool>;
}

/// JSON objects are the native parameter document. Non-object values behave as empty.
///
/// Numbers encoded as strings (as HTML form controls report them) are accepted.
impl ParamSource for serde_json::Value {
    fn number(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    fn text(&self, name: &str) -> Option<String> {
        match self.get(name)? {
            serde_json::Value::String(s) => Some(s.trim().to_string()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    fn flag(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            serde_json::Value::Bool(b) => Some(*b),
            serde_json::Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "on" | "1" => Some(true),
                "false" | "off" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Parse a JSON parameter document. An empty string yields an empty object.
pub fn parse_params(json: &str) -> MediaLabResult<serde_json::Value> {
    if json.trim().is_empty() {
        return Ok(serde_json::Value::Object(Default::default()));
    }
    let v: serde_json::Value =
        serde_json::from_str(json).map_err(|e| MediaLabError::serde(e.to_string()))?;
    if !v.is_object() {
        return Err(MediaLabError::serde("parameters must be a JSON object"));
    }
    Ok(v)
}

pub(crate) fn number_or(params: &dyn ParamSource, name: &str, default: f64) -> MediaLabResult<f64> {
    match params.number(name) {
        None => Ok(default),
        Some(v) if v.is_finite() => Ok(v),
        Some(_) => Err(MediaLabError::validation(format!(
            "parameter '{name}' must be finite when set"
        ))),
    }
}

pub(crate) fn count_or(params: &dyn ParamSource, name: &str, default: u32) -> MediaLabResult<u32> {
    match params.number(name) {
        None => Ok(default),
        Some(v) if v.is_finite() && v >= 0.0 && v <= f64::from(u32::MAX) => Ok(v as u32),
        Some(v) => Err(MediaLabError::validation(format!(
            "parameter '{name}' must be a non-negative integer, got {v}"
        ))),
    }
}

pub(crate) fn text_or(params: &dyn ParamSource, name: &str, default: &str) -> String {
    params
        .text(name)
        .map(|s| s.to_ascii_lowercase())
        .unwrap_or_else(|| default.to_string())
}

pub(crate) fn seed(params: &dyn ParamSource) -> Option<u64> {
    params
        .number("seed")
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v as u64)
}
