use serde_json::Value;

use crate::api::error::ApiError;

/// Rejects absent or blank values; anything else is returned as sent.
pub fn validate_not_empty(value: Option<&str>, field_name: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.to_string()),
        _ => Err(ApiError::bad_request(format!("{} is required", field_name))),
    }
}

/// Row positions arrive as numbers from scripts and as strings from HTML
/// data attributes.
pub fn validate_row_index(value: Option<&Value>) -> Result<u32, ApiError> {
    let parsed = match value {
        None | Some(Value::Null) => return Err(ApiError::bad_request("rowIndex is required")),
        Some(Value::Number(n)) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u32::MAX as f64)
                .map(|f| f as u64)
        }),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        Some(_) => None,
    };

    parsed
        .filter(|&n| n >= 1)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| ApiError::bad_request("rowIndex must be a positive integer"))
}
