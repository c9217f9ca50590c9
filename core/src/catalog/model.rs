use crate::determinism::ids::case_id_ulid;
use crate::error::{CoreError, CoreResult};
use crate::evaluation::model::{AIAnalysisResult, CheckRecord, Verdict};
use serde::{Deserialize, Serialize};

/// Recurring compliance check with an owner, schedule, and pass/fail history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Control {
    pub id: String,
    pub name: String,
    pub domain: String,
    pub frequency: String,
    pub owner: String,
    pub last_verdict: Verdict,
    pub risk_score: u32, // 0-100
    pub next_due: String, // YYYY-MM-DD
}

impl Control {
    /// Overwrites verdict and risk score from a completed evaluation.
    pub fn apply_analysis(&mut self, analysis: &AIAnalysisResult) {
        self.last_verdict = analysis.verdict;
        self.risk_score = analysis.risk_score.min(100);
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EvidenceKind {
    Config,
    Ticket,
    Screenshot,
    Report,
    Log,
}

impl EvidenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceKind::Config => "Config",
            EvidenceKind::Ticket => "Ticket",
            EvidenceKind::Screenshot => "Screenshot",
            EvidenceKind::Report => "Report",
            EvidenceKind::Log => "Log",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LinkStatus {
    Linked,
    Unlinked,
}

/// Document or artifact submitted to support a control's review.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvidenceItem {
    pub id: String,
    pub name: String,
    pub kind: EvidenceKind,
    pub source: String,
    pub status: LinkStatus,
    pub uploaded_by: String,
    pub uploaded_at: String,
    pub linked_control_id: Option<String>,
}

impl EvidenceItem {
    /// The only in-scope mutation: Unlinked -> Linked against a control.
    pub fn link_to(&mut self, control_id: &str) -> CoreResult<()> {
        if self.status == LinkStatus::Linked {
            return Err(CoreError::InvalidInput(format!(
                "evidence {} is already linked",
                self.id
            )));
        }
        self.status = LinkStatus::Linked;
        self.linked_control_id = Some(control_id.to_string());
        Ok(())
    }
}

/// One historical test run of a control.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Run {
    pub id: String,
    pub control_id: String,
    pub control_name: String,
    pub period: String,
    pub verdict: Verdict,
    pub risk: u32,
    pub owner: String,
}

impl Run {
    pub fn from_analysis(
        run_id: String,
        control: &Control,
        period: &str,
        analysis: &AIAnalysisResult,
    ) -> Self {
        Self {
            id: run_id,
            control_id: control.id.clone(),
            control_name: control.name.clone(),
            period: period.to_string(),
            verdict: analysis.verdict,
            risk: analysis.risk_score.min(100),
            owner: control.owner.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CaseSeverity {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum CaseStatus {
    New,
    #[serde(rename = "In Progress")]
    InProgress,
    Waiting,
    Closed,
}

/// Remediation case opened against a control finding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Case {
    pub id: String,
    pub title: String,
    pub severity: CaseSeverity,
    pub status: CaseStatus,
    pub owner: String,
    pub due_date: String,
}

impl Case {
    /// Opens a case from a failing check of a completed evaluation.
    pub fn from_failed_check(
        control: &Control,
        check: &CheckRecord,
        risk_score: u32,
        due_date: &str,
    ) -> CoreResult<Self> {
        if check.result != Verdict::FAIL {
            return Err(CoreError::InvalidInput(format!(
                "check {} did not fail",
                check.name
            )));
        }
        Ok(Self {
            id: case_id_ulid(),
            title: format!("{}: {}", control.id, check.name),
            severity: severity_for_risk(risk_score),
            status: CaseStatus::New,
            owner: control.owner.clone(),
            due_date: due_date.to_string(),
        })
    }
}

fn severity_for_risk(risk_score: u32) -> CaseSeverity {
    if risk_score >= 60 {
        CaseSeverity::High
    } else if risk_score >= 30 {
        CaseSeverity::Medium
    } else {
        CaseSeverity::Low
    }
}
