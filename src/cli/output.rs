use serde::Serialize;
use serde_json::json;

/// Format a result as minified JSON.
pub fn format_json<T: Serialize>(result: &T) -> String {
    serde_json::to_string(result).unwrap_or_else(|e| format_error(&e))
}

/// Acknowledgement printed after a successful mutation.
#[must_use]
pub fn format_success() -> String {
    json!({ "success": true }).to_string()
}

/// Format an error as JSON.
pub fn format_error(err: &dyn std::fmt::Display) -> String {
    json!({ "error": err.to_string() }).to_string()
}
