use crate::inference::interface::GatewayError;
use serde::{Deserialize, Serialize};

#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Verdict {
    PASS,
    FAIL,
}

// Missing fields in a model response degrade to defaults instead of failing
// the whole parse; the verdict default is fail-closed.
impl Default for Verdict {
    fn default() -> Self {
        Verdict::FAIL
    }
}

/// One named sub-criterion within a verdict's supporting detail.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub result: Verdict,
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub citation: String,
}

/// Structured outcome of evaluating a control against its linked evidence.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AIAnalysisResult {
    #[serde(default)]
    pub verdict: Verdict,
    #[serde(default)]
    pub risk_score: u32,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub checks: Vec<CheckRecord>,
}

impl AIAnalysisResult {
    /// Reports whether the verdict agrees with the checks: FAIL iff at
    /// least one check failed. Nothing enforces this; sample data happens
    /// to satisfy it and a model response may not.
    pub fn verdict_consistent(&self) -> bool {
        let any_failed = self.checks.iter().any(|c| c.result == Verdict::FAIL);
        (self.verdict == Verdict::FAIL) == any_failed
    }

    pub fn failed_checks(&self) -> Vec<&CheckRecord> {
        self.checks
            .iter()
            .filter(|c| c.result == Verdict::FAIL)
            .collect()
    }
}

/// Metadata extracted from a single evidence document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionMetadata {
    #[serde(default)]
    pub document_date: String,
    #[serde(default)]
    pub detected_control: String,
    #[serde(default)]
    pub confidence: String,
    #[serde(default)]
    pub summary: String,
}

/// Ephemeral request tying a control to the evidence under review; lives
/// for the duration of one evaluation attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvaluationRequest {
    pub control_id: String,
    pub evidence_ids: Vec<String>,
}

/// Explicit outcome variants: a completed result, a gateway failure after a
/// real call was attempted, or a response that carried no parseable JSON.
/// The three are never collapsed into "no result".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome<T> {
    Completed { result: T },
    GatewayFailure { error: GatewayError },
    Malformed { reason: String },
}

impl<T> RunOutcome<T> {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed { .. })
    }

    pub fn completed(&self) -> Option<&T> {
        match self {
            RunOutcome::Completed { result } => Some(result),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AIAnalysisResult, Verdict};

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let parsed: AIAnalysisResult = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.verdict, Verdict::FAIL);
        assert_eq!(parsed.risk_score, 0);
        assert!(parsed.checks.is_empty());
    }

    #[test]
    fn camel_case_wire_names_round_trip() {
        let json = r#"{"verdict":"PASS","riskScore":15,"explanation":"ok","checks":[]}"#;
        let parsed: AIAnalysisResult = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.verdict, Verdict::PASS);
        assert_eq!(parsed.risk_score, 15);
        assert!(parsed.verdict_consistent());
    }

    #[test]
    fn verdict_consistency_detects_disagreement() {
        let json = r#"{"verdict":"PASS","riskScore":50,"explanation":"",
            "checks":[{"name":"a","result":"FAIL","detail":"","citation":""}]}"#;
        let parsed: AIAnalysisResult = serde_json::from_str(json).unwrap();
        assert!(!parsed.verdict_consistent());
    }
}
