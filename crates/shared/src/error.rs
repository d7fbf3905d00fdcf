use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Failure envelope the analysis backend returns in place of a result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Returns the failure text when `body` carries a truthy `error` field.
///
/// Status codes are not consulted: a 200 with `{"error": "..."}` is a failure
/// and a 500 without one is not. Falsy values (`null`, `false`, `0`, `""`)
/// do not count as failures.
pub fn failure_message(body: &Value) -> Option<String> {
    let error = body.get("error")?;
    let truthy = match error {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    };
    if !truthy {
        return None;
    }
    Some(match error {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn string_error_is_surfaced_verbatim() {
        assert_eq!(
            failure_message(&json!({ "error": "bad date" })).as_deref(),
            Some("bad date")
        );
    }

    #[test]
    fn falsy_error_fields_are_not_failures() {
        assert_eq!(failure_message(&json!({ "error": null, "filename": "x" })), None);
        assert_eq!(failure_message(&json!({ "error": "" })), None);
        assert_eq!(failure_message(&json!({ "error": false })), None);
        assert_eq!(failure_message(&json!({ "filename": "x" })), None);
    }

    #[test]
    fn non_string_truthy_error_is_rendered_as_json() {
        assert_eq!(
            failure_message(&json!({ "error": { "code": 7 } })).as_deref(),
            Some("{\"code\":7}")
        );
    }
}
