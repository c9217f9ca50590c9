use serde::{Deserialize, Serialize};

/// Phase of the single in-flight operation. FAILED is a first-class phase:
/// a gateway failure or malformed response is observable, not a silent
/// return to IDLE.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RunPhase {
    IDLE,
    RUNNING,
    COMPLETE,
    FAILED,
}

pub fn valid_transition(from: RunPhase, to: RunPhase) -> bool {
    use RunPhase::*;
    match (from, to) {
        (IDLE, RUNNING) => true,
        (COMPLETE, RUNNING) => true,
        (FAILED, RUNNING) => true,
        (RUNNING, COMPLETE) => true,
        (RUNNING, FAILED) => true,
        _ => false,
    }
}
