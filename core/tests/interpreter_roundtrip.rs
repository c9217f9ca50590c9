use trustos_core::evaluation::interpret::{interpret_response, InterpretError};
use trustos_core::evaluation::model::{AIAnalysisResult, CheckRecord, Verdict};
use trustos_core::inference::stub::stub_analysis;

fn wrapped(payload: &str, prefix: &str, suffix: &str) -> String {
    format!("{}{}{}", prefix, payload, suffix)
}

#[test]
fn analysis_round_trips_through_arbitrary_prefix_and_suffix() {
    let original = stub_analysis();
    let payload = serde_json::to_string(&original).unwrap();
    let cases = [
        ("", ""),
        ("Sure, here's the result:\n", "\nLet me know."),
        ("Role: auditor.\n", "\nTrailing notes with a stray } brace."),
        ("```json\n", "\n```"),
    ];
    for (prefix, suffix) in cases {
        let parsed: AIAnalysisResult =
            interpret_response(&wrapped(&payload, prefix, suffix)).unwrap();
        assert_eq!(parsed, original, "prefix={:?} suffix={:?}", prefix, suffix);
    }
}

#[test]
fn strings_containing_braces_survive_the_span_scan() {
    let original = AIAnalysisResult {
        verdict: Verdict::FAIL,
        risk_score: 40,
        explanation: "Template {placeholder} left unresolved in config.".to_string(),
        checks: vec![CheckRecord {
            name: "Templating".to_string(),
            result: Verdict::FAIL,
            detail: "Found {{nested}} braces".to_string(),
            citation: "config.yaml line 7".to_string(),
        }],
    };
    let payload = serde_json::to_string(&original).unwrap();
    let parsed: AIAnalysisResult =
        interpret_response(&wrapped(&payload, "prose ", " more prose")).unwrap();
    assert_eq!(parsed, original);
}

#[test]
fn text_without_any_brace_never_raises() {
    for text in ["", "no json here", "PASS FAIL PASS", "]]]]"] {
        let result: Result<AIAnalysisResult, _> = interpret_response(text);
        assert_eq!(result.unwrap_err(), InterpretError::NoJsonObject);
    }
}

#[test]
fn mistyped_fields_are_reported_as_invalid_json() {
    let result: Result<AIAnalysisResult, _> =
        interpret_response(r#"{"verdict": "FAIL", "riskScore": "sixty-five"}"#);
    assert!(matches!(result.unwrap_err(), InterpretError::InvalidJson(_)));
}

#[test]
fn missing_fields_degrade_to_fail_closed_defaults() {
    let parsed: AIAnalysisResult = interpret_response(r#"{"riskScore": 20}"#).unwrap();
    assert_eq!(parsed.verdict, Verdict::FAIL);
    assert_eq!(parsed.risk_score, 20);
    assert!(parsed.checks.is_empty());
}
