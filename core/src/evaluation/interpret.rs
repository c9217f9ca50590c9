use regex::Regex;
use serde::de::DeserializeOwned;
use std::sync::OnceLock;
use thiserror::Error;

/// Interpretation failures are designed outcomes, not propagating errors:
/// the caller records them as a malformed response and moves on.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InterpretError {
    #[error("response contains no JSON object")]
    NoJsonObject,

    #[error("embedded JSON failed to parse: {0}")]
    InvalidJson(String),
}

fn fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").expect("static fence pattern"))
}

/// Models often wrap the object in a fenced code block; unwrap the first
/// fence before scanning for the object itself.
pub fn strip_code_fences(text: &str) -> &str {
    match fence_re().captures(text) {
        Some(caps) => caps.get(1).map(|m| m.as_str()).unwrap_or(text),
        None => text,
    }
}

/// Locates the first balanced `{...}` object in the text. The scan tracks
/// string and escape state, so braces inside string literals do not count
/// toward nesting, and trailing prose after the object (stray `}` included)
/// is ignored.
pub fn extract_json_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parses the first JSON object embedded in a free-text model response.
pub fn interpret_response<T: DeserializeOwned>(text: &str) -> Result<T, InterpretError> {
    let unfenced = strip_code_fences(text);
    let span = extract_json_span(unfenced).ok_or(InterpretError::NoJsonObject)?;
    serde_json::from_str(span).map_err(|e| InterpretError::InvalidJson(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{extract_json_span, interpret_response, strip_code_fences, InterpretError};
    use serde_json::{json, Value};

    #[test]
    fn span_survives_prose_with_stray_braces_after_the_object() {
        let text = "Here is the result: {\"a\": 1} and a stray } later.";
        assert_eq!(extract_json_span(text), Some("{\"a\": 1}"));
    }

    #[test]
    fn braces_inside_string_literals_do_not_count() {
        let text = r#"{"detail": "rule {42} allows ANY"} trailing"#;
        assert_eq!(
            extract_json_span(text),
            Some(r#"{"detail": "rule {42} allows ANY"}"#)
        );
    }

    #[test]
    fn first_of_two_objects_wins() {
        let text = r#"{"first": true} {"second": true}"#;
        let parsed: Value = interpret_response(text).unwrap();
        assert_eq!(parsed, json!({"first": true}));
    }

    #[test]
    fn no_brace_yields_no_json_object_not_a_panic() {
        let result: Result<Value, _> = interpret_response("no object here at all");
        assert_eq!(result.unwrap_err(), InterpretError::NoJsonObject);
    }

    #[test]
    fn unbalanced_object_yields_no_json_object() {
        let result: Result<Value, _> = interpret_response("{\"open\": true");
        assert_eq!(result.unwrap_err(), InterpretError::NoJsonObject);
    }

    #[test]
    fn invalid_json_inside_a_balanced_span_is_reported() {
        let result: Result<Value, _> = interpret_response("{not json}");
        assert!(matches!(result.unwrap_err(), InterpretError::InvalidJson(_)));
    }

    #[test]
    fn fenced_block_is_unwrapped_before_scanning() {
        let text = "```json\n{\"a\": 2}\n```";
        assert_eq!(strip_code_fences(text), "{\"a\": 2}");
        let parsed: Value = interpret_response(text).unwrap();
        assert_eq!(parsed, json!({"a": 2}));
    }

    #[test]
    fn round_trips_any_object_wrapped_in_arbitrary_text() {
        let object = json!({
            "verdict": "FAIL",
            "riskScore": 65,
            "explanation": "Critical failure: 'ANY ANY ALLOW' rule detected on row 42.",
            "checks": [{"name": "Timeliness", "result": "PASS", "detail": "ok", "citation": "Policy §9.1"}]
        });
        let wrapped = format!(
            "Sure! Here's the evaluation you asked for:\n{}\nLet me know if {{anything}} else helps.",
            serde_json::to_string(&object).unwrap()
        );
        let parsed: Value = interpret_response(&wrapped).unwrap();
        assert_eq!(parsed, object);
    }
}
