use crate::determinism::json_canonical;
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    System,
    User,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditEvent {
    pub ts_utc: String, // RFC3339 UTC string
    pub event_type: String,
    pub run_id: String,
    pub subject_id: String, // control or evidence identifier
    pub actor: Actor,
    pub details: serde_json::Value,
    pub prev_event_hash: String, // hex 64
    pub event_hash: String,      // hex 64
}

pub const ZERO_HASH_64: &str = "0000000000000000000000000000000000000000000000000000000000000000";

// event_hash = SHA-256(canonical_event_bytes) with the event_hash field
// forced to ZERO_HASH_64 during hashing, so the envelope hashes itself
// without key omission.
pub fn compute_event_hash(event: &AuditEvent) -> CoreResult<String> {
    let mut e = event.clone();
    e.event_hash = ZERO_HASH_64.to_string();
    let bytes = json_canonical::to_canonical_bytes(&e)?;
    let mut h = Sha256::new();
    h.update(bytes);
    Ok(hex::encode(h.finalize()))
}

pub fn finalize_event(mut event: AuditEvent) -> CoreResult<AuditEvent> {
    if event.prev_event_hash.len() != 64
        || !event.prev_event_hash.chars().all(|c| c.is_ascii_hexdigit())
    {
        return Err(CoreError::InvalidInput(
            "prev_event_hash must be 64 hex chars".to_string(),
        ));
    }
    validate_event_taxonomy(&event)?;
    let eh = compute_event_hash(&event)?;
    event.event_hash = eh;
    Ok(event)
}

fn validate_event_taxonomy(event: &AuditEvent) -> CoreResult<()> {
    let allowed = [
        "RUN_STATE_CHANGED",
        "EVAL_STARTED",
        "EVAL_COMPLETED",
        "EVAL_FAILED",
        "EXTRACTION_STARTED",
        "EXTRACTION_COMPLETED",
        "EXTRACTION_FAILED",
        "SUMMARY_STARTED",
        "SUMMARY_COMPLETED",
        "SUMMARY_FAILED",
        "MODEL_CALL_STARTED",
        "MODEL_CALL_COMPLETED",
        "MODEL_CALL_FAILED",
        "NO_AI_MODE_USED",
        "EVIDENCE_LINKED",
        "CASE_OPENED",
    ];
    if !allowed.contains(&event.event_type.as_str()) {
        return Err(CoreError::InvalidInput(format!(
            "unknown event_type {}",
            event.event_type
        )));
    }
    let required = required_detail_keys(&event.event_type);
    for k in required {
        if event.details.get(k).is_none() {
            return Err(CoreError::InvalidInput(format!(
                "event {} missing details.{}",
                event.event_type, k
            )));
        }
    }
    Ok(())
}

fn required_detail_keys(event_type: &str) -> &'static [&'static str] {
    match event_type {
        "RUN_STATE_CHANGED" => &["from_phase", "to_phase", "reason"],
        "EVAL_STARTED" => &["control_id", "evidence_ids"],
        "EVAL_COMPLETED" => &["verdict", "risk_score", "checks_total", "checks_failed"],
        "EVAL_FAILED" => &["reason"],
        "EXTRACTION_STARTED" => &["evidence_id", "evidence_name"],
        "EXTRACTION_COMPLETED" => &["detected_control", "confidence"],
        "EXTRACTION_FAILED" => &["reason"],
        "SUMMARY_STARTED" => &["controls_total"],
        "SUMMARY_COMPLETED" => &["summary_sha256"],
        "SUMMARY_FAILED" => &["reason"],
        "MODEL_CALL_STARTED" => &["call_id", "model_id", "prompt_sha256"],
        "MODEL_CALL_COMPLETED" => &["call_id", "response_sha256", "duration_ms"],
        "MODEL_CALL_FAILED" => &["call_id", "error_category", "error_code"],
        "NO_AI_MODE_USED" => &["reason", "operation"],
        "EVIDENCE_LINKED" => &["evidence_id", "control_id"],
        "CASE_OPENED" => &["case_id", "control_id", "severity"],
        _ => &[],
    }
}

pub fn now_rfc3339_utc() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}

#[cfg(test)]
mod tests {
    use super::{compute_event_hash, finalize_event, Actor, AuditEvent, ZERO_HASH_64};
    use serde_json::json;

    fn sample_event() -> AuditEvent {
        AuditEvent {
            ts_utc: "2025-10-08T00:00:00Z".to_string(),
            event_type: "EVAL_STARTED".to_string(),
            run_id: "run_test".to_string(),
            subject_id: "NET-01".to_string(),
            actor: Actor::User,
            details: json!({"control_id": "NET-01", "evidence_ids": ["1", "2"]}),
            prev_event_hash: ZERO_HASH_64.to_string(),
            event_hash: String::new(),
        }
    }

    #[test]
    fn event_hash_is_stable_for_identical_events() {
        let a = finalize_event(sample_event()).unwrap();
        let b = finalize_event(sample_event()).unwrap();
        assert_eq!(a.event_hash, b.event_hash);
        assert_eq!(a.event_hash, compute_event_hash(&a).unwrap());
    }

    #[test]
    fn unknown_event_type_is_rejected() {
        let mut e = sample_event();
        e.event_type = "SOMETHING_ELSE".to_string();
        assert!(finalize_event(e).is_err());
    }

    #[test]
    fn missing_required_detail_key_is_rejected() {
        let mut e = sample_event();
        e.details = json!({"control_id": "NET-01"});
        let err = finalize_event(e).unwrap_err();
        assert!(err.to_string().contains("missing details.evidence_ids"));
    }
}
