//! Normalisation of the backend's `detail` error field.
//!
//! FastAPI-style backends report errors as `{"detail": ...}` where the value is a
//! plain string, a list of validation errors (`[{"msg": ...}, ...]`) or an object.

use serde_json::Value;

pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Render a `detail` value as a single display string.
pub fn format_detail(detail: &Value) -> String {
    match detail {
        Value::Null => UNKNOWN_ERROR.to_string(),
        Value::String(text) if text.trim().is_empty() => UNKNOWN_ERROR.to_string(),
        Value::String(text) => text.clone(),
        Value::Array(entries) => entries.iter().map(validation_message).collect::<Vec<_>>().join("\n"),
        Value::Object(_) => detail.to_string(),
        other => other.to_string(),
    }
}

fn validation_message(entry: &Value) -> String {
    match entry.get("msg") {
        Some(Value::String(msg)) => msg.clone(),
        Some(other) => other.to_string(),
        None => match entry {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        },
    }
}

/// Extract a display string from an error response body.
pub fn detail_from_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return UNKNOWN_ERROR.to_string();
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => match map.get("detail") {
            Some(detail) => format_detail(detail),
            None => Value::Object(map).to_string(),
        },
        Ok(other) => format_detail(&other),
        Err(_) => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn string_detail_passes_through() {
        assert_eq!(format_detail(&json!("Passwords do not match")), "Passwords do not match");
    }

    #[test]
    fn validation_list_joins_messages() {
        let detail = json!([
            { "loc": ["body", "password"], "msg": "String should have at least 6 characters" },
            { "loc": ["body", "username"], "msg": "Field required" }
        ]);
        assert_eq!(
            format_detail(&detail),
            "String should have at least 6 characters\nField required"
        );
    }

    #[test]
    fn object_detail_is_json_encoded() {
        let rendered = format_detail(&json!({ "code": "quota" }));
        assert_eq!(rendered, r#"{"code":"quota"}"#);
    }

    #[test]
    fn missing_or_empty_detail_is_unknown() {
        assert_eq!(format_detail(&Value::Null), UNKNOWN_ERROR);
        assert_eq!(detail_from_body(""), UNKNOWN_ERROR);
        assert_eq!(detail_from_body(r#"{"detail": null}"#), UNKNOWN_ERROR);
    }

    #[test]
    fn body_parsing_prefers_detail_then_raw_text() {
        assert_eq!(detail_from_body(r#"{"detail":"Item not found"}"#), "Item not found");
        assert_eq!(detail_from_body("Internal Server Error\n"), "Internal Server Error");
    }
}
