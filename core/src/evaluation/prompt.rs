use crate::catalog::model::Control;
use crate::evaluation::model::Verdict;
use std::fmt::Write;

/// Inputs for one evaluation prompt. The current date is an input, not a
/// clock read, so identical contexts always build identical prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptContext {
    pub control_id: String,
    pub control_name: String,
    pub policy_rules: Vec<String>,
    pub evidence_names: Vec<String>,
    pub current_date: String, // YYYY-MM-DD
}

impl PromptContext {
    pub fn for_control(
        control: &Control,
        policy_rules: Vec<String>,
        evidence_names: Vec<String>,
        current_date: &str,
    ) -> Self {
        Self {
            control_id: control.id.clone(),
            control_name: control.name.clone(),
            policy_rules,
            evidence_names,
            current_date: current_date.to_string(),
        }
    }
}

pub fn build_evaluation_prompt(ctx: &PromptContext) -> String {
    let mut prompt = String::new();
    let _ = writeln!(prompt, "Act as a Cyber Security Auditor.");
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Control: {} {}.", ctx.control_id, ctx.control_name);
    let _ = writeln!(prompt, "Evidence: {}.", ctx.evidence_names.join(", "));
    let _ = writeln!(prompt, "Policy Rules:");
    for (i, rule) in ctx.policy_rules.iter().enumerate() {
        let _ = writeln!(prompt, "{}. {}", i + 1, rule);
    }
    let _ = writeln!(prompt, "Current Date: {}.", ctx.current_date);
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Evaluate compliance. Return ONLY valid JSON with this exact shape:");
    let _ = writeln!(prompt, "{{");
    let _ = writeln!(prompt, "  \"verdict\": \"PASS\" or \"FAIL\",");
    let _ = writeln!(prompt, "  \"riskScore\": integer 0-100,");
    let _ = writeln!(prompt, "  \"explanation\": string,");
    let _ = writeln!(prompt, "  \"checks\": [");
    let _ = writeln!(
        prompt,
        "    {{\"name\": string, \"result\": \"PASS\" or \"FAIL\", \"detail\": string, \"citation\": string}}"
    );
    let _ = writeln!(prompt, "  ]");
    let _ = writeln!(prompt, "}}");
    prompt
}

pub fn build_extraction_prompt(evidence_name: &str, evidence_kind: &str) -> String {
    format!(
        "Extract metadata from cyber security evidence \"{}\" type \"{}\". \
         Return ONLY valid JSON: {{ \"documentDate\": \"YYYY-MM-DD\", \
         \"detectedControl\": string, \"confidence\": \"number %\", \"summary\": string }}.",
        evidence_name, evidence_kind
    )
}

pub fn build_posture_summary_prompt(controls: &[Control], current_date: &str) -> String {
    let overall = controls.iter().map(|c| c.risk_score).max().unwrap_or(0);
    let failing: Vec<String> = controls
        .iter()
        .filter(|c| c.last_verdict == Verdict::FAIL)
        .map(|c| format!("{} {} (risk {})", c.id, c.name, c.risk_score))
        .collect();
    let stable: Vec<String> = controls
        .iter()
        .filter(|c| c.last_verdict == Verdict::PASS)
        .map(|c| c.id.clone())
        .collect();
    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "Act as a Cyber Security Auditor. Summarize this risk posture:"
    );
    let _ = writeln!(prompt, "Overall risk score: {}/100.", overall);
    let _ = writeln!(prompt, "Failing controls: {}.", failing.join("; "));
    let _ = writeln!(prompt, "Stable controls: {}.", stable.join(", "));
    let _ = writeln!(prompt, "Current Date: {}.", current_date);
    let _ = writeln!(
        prompt,
        "Suggest immediate remediation for the highest-risk failures."
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::{build_evaluation_prompt, build_extraction_prompt, PromptContext};

    fn net01_context() -> PromptContext {
        PromptContext {
            control_id: "NET-01".to_string(),
            control_name: "Firewall Rule Review".to_string(),
            policy_rules: vec![
                "Firewall rules must be reviewed quarterly.".to_string(),
                "No \"ANY ANY ALLOW\" rules are permitted in production.".to_string(),
                "All rule changes must have an approved Jira ticket.".to_string(),
            ],
            evidence_names: vec![
                "firewall_rules_Jan2026.csv".to_string(),
                "rules_change_ticket.pdf".to_string(),
            ],
            current_date: "2025-10-08".to_string(),
        }
    }

    #[test]
    fn evaluation_prompt_is_deterministic() {
        assert_eq!(
            build_evaluation_prompt(&net01_context()),
            build_evaluation_prompt(&net01_context())
        );
    }

    #[test]
    fn evaluation_prompt_embeds_role_policy_evidence_and_shape() {
        let prompt = build_evaluation_prompt(&net01_context());
        assert!(prompt.starts_with("Act as a Cyber Security Auditor."));
        assert!(prompt.contains("Control: NET-01 Firewall Rule Review."));
        assert!(prompt.contains("2. No \"ANY ANY ALLOW\" rules are permitted in production."));
        assert!(prompt.contains("firewall_rules_Jan2026.csv"));
        assert!(prompt.contains("Current Date: 2025-10-08."));
        assert!(prompt.contains("\"riskScore\""));
        assert!(prompt.contains("\"checks\""));
        assert!(prompt.contains("\"citation\""));
    }

    #[test]
    fn extraction_prompt_names_the_document_and_shape() {
        let prompt = build_extraction_prompt("vuln_scan_oct_2025.pdf", "Report");
        assert!(prompt.contains("\"vuln_scan_oct_2025.pdf\""));
        assert!(prompt.contains("type \"Report\""));
        assert!(prompt.contains("\"detectedControl\""));
    }
}
