use super::model::{
    Case, CaseSeverity, CaseStatus, Control, EvidenceItem, EvidenceKind, LinkStatus, Run,
};
use crate::evaluation::model::Verdict;

fn control(
    id: &str,
    name: &str,
    domain: &str,
    frequency: &str,
    owner: &str,
    last_verdict: Verdict,
    risk_score: u32,
    next_due: &str,
) -> Control {
    Control {
        id: id.to_string(),
        name: name.to_string(),
        domain: domain.to_string(),
        frequency: frequency.to_string(),
        owner: owner.to_string(),
        last_verdict,
        risk_score,
        next_due: next_due.to_string(),
    }
}

pub fn sample_controls() -> Vec<Control> {
    let mut controls = vec![
        control("IAM-01", "Monthly Access Review", "IAM", "Monthly", "Raj", Verdict::FAIL, 72, "2025-10-31"),
        control("IAM-02", "Privileged Access Review", "IAM", "Quarterly", "Raj", Verdict::PASS, 12, "2025-11-15"),
        control("IAM-03", "MFA Enforcement", "IAM", "Continuous", "Sarah", Verdict::PASS, 5, "2025-10-15"),
        control("NET-01", "Firewall Rule Review", "Network", "Quarterly", "Arjun", Verdict::FAIL, 65, "2025-10-30"),
        control("NET-02", "VPN Access Monitoring", "Network", "Monthly", "Arjun", Verdict::PASS, 20, "2025-10-31"),
        control("END-01", "Antivirus / EDR Compliance", "Endpoint", "Weekly", "Nina", Verdict::PASS, 15, "2025-10-14"),
        control("CLOUD-01", "S3 Bucket Permissions", "Cloud", "Continuous", "Sarah", Verdict::FAIL, 88, "2025-10-12"),
        control("VULN-01", "Monthly Vuln Scan Review", "Vulnerability", "Monthly", "Nina", Verdict::PASS, 30, "2025-10-31"),
        control("BACKUP-01", "Backup Success Rate", "Backup", "Daily", "System", Verdict::PASS, 2, "2025-10-09"),
    ];
    controls.sort_by(|a, b| a.id.cmp(&b.id));
    controls
}

/// Fixed policy text per control. NET-01 carries the full firewall review
/// policy; other controls fall back to their schedule and the change
/// authorization baseline.
pub fn policy_rules_for(control: &Control) -> Vec<String> {
    match control.id.as_str() {
        "NET-01" => vec![
            "Firewall rules must be reviewed quarterly.".to_string(),
            "No \"ANY ANY ALLOW\" rules are permitted in production.".to_string(),
            "All rule changes must have an approved Jira ticket.".to_string(),
        ],
        _ => vec![
            format!("{} review required.", control.frequency),
            "All changes must be authorized via an approved ticket.".to_string(),
        ],
    }
}

pub fn controls_for_domain(controls: &[Control], domains: &[String]) -> Vec<Control> {
    if domains.is_empty() {
        return controls.to_vec();
    }
    let mut normalized = domains.to_vec();
    normalized.sort();
    normalized.dedup();
    let mut out: Vec<Control> = controls
        .iter()
        .filter(|c| normalized.iter().any(|d| d == &c.domain))
        .cloned()
        .collect();
    out.sort_by(|a, b| a.id.cmp(&b.id));
    out
}

fn evidence(
    id: &str,
    name: &str,
    kind: EvidenceKind,
    source: &str,
    status: LinkStatus,
    uploaded_by: &str,
    uploaded_at: &str,
    linked_control_id: Option<&str>,
) -> EvidenceItem {
    EvidenceItem {
        id: id.to_string(),
        name: name.to_string(),
        kind,
        source: source.to_string(),
        status,
        uploaded_by: uploaded_by.to_string(),
        uploaded_at: uploaded_at.to_string(),
        linked_control_id: linked_control_id.map(str::to_string),
    }
}

pub fn sample_evidence() -> Vec<EvidenceItem> {
    vec![
        evidence("1", "firewall_rules_Jan2026.csv", EvidenceKind::Config, "Palo Alto", LinkStatus::Linked, "Arjun", "10:31 AM", Some("NET-01")),
        evidence("2", "rules_change_ticket.pdf", EvidenceKind::Ticket, "Jira", LinkStatus::Linked, "Arjun", "10:30 AM", Some("NET-01")),
        evidence("3", "screenshot_fw_console.png", EvidenceKind::Screenshot, "Upload", LinkStatus::Linked, "Arjun", "10:29 AM", Some("NET-01")),
        evidence("4", "vuln_scan_oct_2025.pdf", EvidenceKind::Report, "Tenable", LinkStatus::Unlinked, "Nina", "09:15 AM", None),
        evidence("5", "aws_config_snapshot.json", EvidenceKind::Log, "AWS", LinkStatus::Unlinked, "System", "08:00 AM", None),
    ]
}

pub fn linked_evidence_for_control<'a>(
    items: &'a [EvidenceItem],
    control_id: &str,
) -> Vec<&'a EvidenceItem> {
    items
        .iter()
        .filter(|e| {
            e.status == LinkStatus::Linked && e.linked_control_id.as_deref() == Some(control_id)
        })
        .collect()
}

fn run(id: &str, control_id: &str, control_name: &str, period: &str, verdict: Verdict, risk: u32, owner: &str) -> Run {
    Run {
        id: id.to_string(),
        control_id: control_id.to_string(),
        control_name: control_name.to_string(),
        period: period.to_string(),
        verdict,
        risk,
        owner: owner.to_string(),
    }
}

pub fn sample_runs() -> Vec<Run> {
    vec![
        run("RUN-2055", "NET-01", "Firewall Rule Review", "Q3 2025", Verdict::FAIL, 65, "Arjun"),
        run("RUN-2054", "IAM-01", "Monthly Access Review", "Sep 2025", Verdict::FAIL, 72, "Raj"),
        run("RUN-2053", "CLOUD-01", "S3 Bucket Permissions", "Continuous", Verdict::FAIL, 88, "Sarah"),
        run("RUN-2052", "VULN-01", "Monthly Vuln Scan", "Sep 2025", Verdict::PASS, 30, "Nina"),
        run("RUN-2051", "BACKUP-01", "Backup Success Rate", "Oct 8 2025", Verdict::PASS, 2, "System"),
    ]
}

fn case(id: &str, title: &str, severity: CaseSeverity, status: CaseStatus, owner: &str, due_date: &str) -> Case {
    Case {
        id: id.to_string(),
        title: title.to_string(),
        severity,
        status,
        owner: owner.to_string(),
        due_date: due_date.to_string(),
    }
}

pub fn sample_cases() -> Vec<Case> {
    vec![
        case("INC-201", "Open S3 Bucket Detected", CaseSeverity::High, CaseStatus::InProgress, "Sarah", "2025-10-12"),
        case("INC-202", "Firewall \"ANY ANY\" Rule Found", CaseSeverity::High, CaseStatus::New, "Arjun", "2025-10-10"),
        case("REM-305", "Missing Evidence for IAM-01", CaseSeverity::Medium, CaseStatus::Waiting, "Raj", "2025-10-15"),
        case("REM-301", "Patching SLA Breach", CaseSeverity::Low, CaseStatus::Closed, "Nina", "2025-09-30"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_controls_are_sorted_by_id() {
        let controls = sample_controls();
        assert_eq!(controls.len(), 9);
        for pair in controls.windows(2) {
            assert!(pair[0].id < pair[1].id);
        }
    }

    #[test]
    fn domain_filter_is_exact_and_deduped() {
        let controls = sample_controls();
        let filtered = controls_for_domain(
            &controls,
            &["Network".to_string(), "Network".to_string()],
        );
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|c| c.domain == "Network"));
    }

    #[test]
    fn empty_domain_filter_returns_everything() {
        let controls = sample_controls();
        assert_eq!(controls_for_domain(&controls, &[]).len(), controls.len());
    }

    #[test]
    fn sample_cases_cover_every_severity() {
        let cases = sample_cases();
        assert_eq!(cases.len(), 4);
        assert!(cases.iter().any(|c| c.severity == CaseSeverity::High));
        assert!(cases.iter().any(|c| c.severity == CaseSeverity::Low));
    }

    #[test]
    fn linked_evidence_follows_control_id() {
        let items = sample_evidence();
        let linked = linked_evidence_for_control(&items, "NET-01");
        assert_eq!(linked.len(), 3);
        assert!(linked.iter().all(|e| e.status == LinkStatus::Linked));
    }
}
