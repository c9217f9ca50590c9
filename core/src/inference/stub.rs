use crate::evaluation::model::{AIAnalysisResult, CheckRecord, ExtractionMetadata, Verdict};
use std::time::Duration;

/// Artificial pacing for the no-credentials fallback path. The delay exists
/// only to keep the "working" phase observable; tests use `instant()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StubPacing {
    pub evaluation_delay: Duration,
    pub summary_delay: Duration,
}

impl Default for StubPacing {
    fn default() -> Self {
        Self {
            evaluation_delay: Duration::from_millis(2000),
            summary_delay: Duration::from_millis(1500),
        }
    }
}

impl StubPacing {
    pub fn instant() -> Self {
        Self {
            evaluation_delay: Duration::ZERO,
            summary_delay: Duration::ZERO,
        }
    }
}

fn check(name: &str, result: Verdict, detail: &str, citation: &str) -> CheckRecord {
    CheckRecord {
        name: name.to_string(),
        result,
        detail: detail.to_string(),
        citation: citation.to_string(),
    }
}

/// Fixed evaluation result returned when no credentials are configured.
pub fn stub_analysis() -> AIAnalysisResult {
    AIAnalysisResult {
        verdict: Verdict::FAIL,
        risk_score: 65,
        explanation: "The control failed because a high-risk 'ANY ANY ALLOW' rule was detected \
                      in the production firewall config, and 3 rule changes lacked corresponding \
                      Jira tickets."
            .to_string(),
        checks: vec![
            check(
                "Timeliness",
                Verdict::PASS,
                "Review initiated within Q3 window.",
                "Policy §9.1",
            ),
            check(
                "Unsafe Rules Check",
                Verdict::FAIL,
                "Rule #42 allows ANY source to ANY dest on ANY port.",
                "firewall_rules.csv row 42",
            ),
            check(
                "Change Authorization",
                Verdict::FAIL,
                "3 changes found without matching Jira tickets.",
                "Diff Analysis",
            ),
        ],
    }
}

/// Fixed extraction result returned when no credentials are configured.
pub fn stub_extraction() -> ExtractionMetadata {
    ExtractionMetadata {
        document_date: "2025-10-01".to_string(),
        detected_control: "NET-01".to_string(),
        confidence: "98%".to_string(),
        summary: "Contains firewall rule base export with 250 rules.".to_string(),
    }
}

/// Fixed posture summary returned when no credentials are configured.
pub fn stub_posture_summary() -> String {
    "<ul><li><strong>Critical Risk:</strong> 'ANY ANY' Allow rules detected in NET-01 \
     (Firewall). Immediate remediation required.</li><li><strong>Cloud Exposure:</strong> \
     Public S3 bucket permissions found in CLOUD-01.</li><li><strong>Trend:</strong> IAM \
     controls are stable, but Network and Cloud domains show regression.</li></ul>"
        .to_string()
}
