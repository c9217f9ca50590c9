use crate::catalog::model::{EvidenceItem, LinkStatus, Run};
use crate::error::CoreResult;
use crate::evaluation::model::{AIAnalysisResult, Verdict};

pub fn render_evidence_index_csv(items: &[EvidenceItem]) -> CoreResult<String> {
    let mut rows = items.to_vec();
    rows.sort_by(|a, b| a.id.cmp(&b.id));

    let mut wtr = csv::WriterBuilder::new().from_writer(vec![]);
    wtr.write_record(["id", "name", "kind", "source", "status", "uploaded_by", "linked_control"])?;
    for row in rows {
        wtr.write_record([
            row.id,
            row.name,
            row.kind.as_str().to_string(),
            row.source,
            match row.status {
                LinkStatus::Linked => "Linked".to_string(),
                LinkStatus::Unlinked => "Unlinked".to_string(),
            },
            row.uploaded_by,
            row.linked_control_id.unwrap_or_default(),
        ])?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).replace("\r\n", "\n"))
}

pub fn render_evidence_index_markdown(items: &[EvidenceItem]) -> String {
    let mut rows = items.to_vec();
    rows.sort_by(|a, b| a.id.cmp(&b.id));

    let mut out = Vec::new();
    out.push("# Evidence Index".to_string());
    out.push("".to_string());
    out.push("| ID | Name | Kind | Source | Status | Uploaded By |".to_string());
    out.push("|---|---|---|---|---|---|".to_string());
    for row in rows {
        out.push(format!(
            "| {} | {} | {} | {} | {:?} | {} |",
            row.id,
            row.name,
            row.kind.as_str(),
            row.source,
            row.status,
            row.uploaded_by
        ));
    }
    out.push("".to_string());
    out.join("\n")
}

pub fn render_run_history_markdown(runs: &[Run]) -> String {
    let mut out = Vec::new();
    out.push("# Run History".to_string());
    out.push("".to_string());
    out.push("| Run ID | Control | Period | Verdict | Risk | Owner |".to_string());
    out.push("|---|---|---|---|---|---|".to_string());
    for run in runs {
        out.push(format!(
            "| {} | {} | {} | {:?} | {} | {} |",
            run.id, run.control_name, run.period, run.verdict, run.risk, run.owner
        ));
    }
    out.push("".to_string());
    out.join("\n")
}

pub fn render_analysis_markdown(control_id: &str, analysis: &AIAnalysisResult) -> String {
    let mut out = Vec::new();
    out.push(format!("# Evaluation Result: {}", control_id));
    out.push("".to_string());
    out.push(format!(
        "**Verdict: {:?}** (risk {})",
        analysis.verdict, analysis.risk_score
    ));
    out.push("".to_string());
    out.push(analysis.explanation.clone());
    out.push("".to_string());
    out.push("| Check | Result | Detail | Citation |".to_string());
    out.push("|---|---|---|---|".to_string());
    for check in &analysis.checks {
        out.push(format!(
            "| {} | {:?} | {} | {} |",
            check.name, check.result, check.detail, check.citation
        ));
    }
    if analysis.verdict == Verdict::FAIL && analysis.failed_checks().is_empty() {
        out.push("".to_string());
        out.push("_Verdict disagrees with checks: no failing check was reported._".to_string());
    }
    out.push("".to_string());
    out.join("\n")
}
