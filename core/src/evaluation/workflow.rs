use crate::audit::event::{now_rfc3339_utc, Actor, AuditEvent};
use crate::audit::log::AuditLog;
use crate::catalog::model::{Case, Control, EvidenceItem};
use crate::determinism::ids::{call_id_ulid, run_id_ulid, sha256_hex};
use crate::error::{CoreError, CoreResult};
use crate::evaluation::interpret::interpret_response;
use crate::evaluation::model::{
    AIAnalysisResult, CheckRecord, EvaluationRequest, ExtractionMetadata, RunOutcome,
};
use crate::evaluation::prompt::{
    build_evaluation_prompt, build_extraction_prompt, build_posture_summary_prompt, PromptContext,
};
use crate::evaluation::state::{valid_transition, RunPhase};
use crate::inference::config::InferenceStrategy;
use crate::inference::interface::{classify_gateway_error, GatewayError, InferenceRequest};
use crate::inference::stub::{stub_analysis, stub_extraction, stub_posture_summary, StubPacing};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Instant;

/// Orchestrates one operation at a time: evaluation, extraction, or posture
/// summary. The inference strategy is injected; the audit log records every
/// phase change and model call.
pub struct EvaluationEngine {
    strategy: InferenceStrategy,
    audit: AuditLog,
    run_id: String,
    phase: RunPhase,
    last_evaluation: Option<RunOutcome<AIAnalysisResult>>,
    last_extraction: Option<RunOutcome<ExtractionMetadata>>,
    last_summary: Option<RunOutcome<String>>,
}

enum CallResult {
    Text(String),
    Failed(GatewayError),
}

impl EvaluationEngine {
    pub fn new(strategy: InferenceStrategy, audit: AuditLog) -> Self {
        Self {
            strategy,
            audit,
            run_id: run_id_ulid(),
            phase: RunPhase::IDLE,
            last_evaluation: None,
            last_extraction: None,
            last_summary: None,
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn last_evaluation(&self) -> Option<&RunOutcome<AIAnalysisResult>> {
        self.last_evaluation.as_ref()
    }

    pub fn last_extraction(&self) -> Option<&RunOutcome<ExtractionMetadata>> {
        self.last_extraction.as_ref()
    }

    pub fn last_summary(&self) -> Option<&RunOutcome<String>> {
        self.last_summary.as_ref()
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Evaluates a control against its linked evidence. The returned
    /// outcome is also retained as the observable evaluation state; only
    /// engine-level conditions (busy, invalid transition, audit I/O)
    /// surface as `Err`.
    pub fn start_evaluation(
        &mut self,
        request: &EvaluationRequest,
        ctx: &PromptContext,
    ) -> CoreResult<RunOutcome<AIAnalysisResult>> {
        self.begin(&request.control_id, "evaluation requested")?;
        self.last_evaluation = None;

        self.append(
            "EVAL_STARTED",
            &request.control_id,
            Actor::User,
            json!({
                "control_id": request.control_id,
                "evidence_ids": request.evidence_ids,
            }),
        )?;

        let outcome = self.run_json_operation(
            &request.control_id,
            "evaluation",
            |pacing| pacing.evaluation_delay,
            stub_analysis,
            |model_id| InferenceRequest::user(model_id, build_evaluation_prompt(ctx)),
        )?;

        match &outcome {
            RunOutcome::Completed { result } => {
                self.append(
                    "EVAL_COMPLETED",
                    &request.control_id,
                    Actor::System,
                    json!({
                        "verdict": result.verdict,
                        "risk_score": result.risk_score,
                        "checks_total": result.checks.len(),
                        "checks_failed": result.failed_checks().len(),
                    }),
                )?;
                self.finish(&request.control_id, RunPhase::COMPLETE, "evaluation completed")?;
            }
            RunOutcome::GatewayFailure { error } => {
                let reason = error.category.clone();
                self.append("EVAL_FAILED", &request.control_id, Actor::System, json!({"reason": reason}))?;
                self.finish(&request.control_id, RunPhase::FAILED, "evaluation failed")?;
            }
            RunOutcome::Malformed { reason } => {
                let reason = reason.clone();
                self.append("EVAL_FAILED", &request.control_id, Actor::System, json!({"reason": reason}))?;
                self.finish(&request.control_id, RunPhase::FAILED, "evaluation failed")?;
            }
        }

        self.last_evaluation = Some(outcome.clone());
        Ok(outcome)
    }

    /// Extracts metadata from one evidence document.
    pub fn start_extraction(
        &mut self,
        item: &EvidenceItem,
    ) -> CoreResult<RunOutcome<ExtractionMetadata>> {
        self.begin(&item.id, "extraction requested")?;
        self.last_extraction = None;

        self.append(
            "EXTRACTION_STARTED",
            &item.id,
            Actor::User,
            json!({
                "evidence_id": item.id,
                "evidence_name": item.name,
            }),
        )?;

        let outcome = self.run_json_operation(
            &item.id,
            "extraction",
            |pacing| pacing.evaluation_delay,
            stub_extraction,
            |model_id| {
                InferenceRequest::user(
                    model_id,
                    build_extraction_prompt(&item.name, item.kind.as_str()),
                )
            },
        )?;

        match &outcome {
            RunOutcome::Completed { result } => {
                self.append(
                    "EXTRACTION_COMPLETED",
                    &item.id,
                    Actor::System,
                    json!({
                        "detected_control": result.detected_control,
                        "confidence": result.confidence,
                    }),
                )?;
                self.finish(&item.id, RunPhase::COMPLETE, "extraction completed")?;
            }
            RunOutcome::GatewayFailure { error } => {
                let reason = error.category.clone();
                self.append("EXTRACTION_FAILED", &item.id, Actor::System, json!({"reason": reason}))?;
                self.finish(&item.id, RunPhase::FAILED, "extraction failed")?;
            }
            RunOutcome::Malformed { reason } => {
                let reason = reason.clone();
                self.append("EXTRACTION_FAILED", &item.id, Actor::System, json!({"reason": reason}))?;
                self.finish(&item.id, RunPhase::FAILED, "extraction failed")?;
            }
        }

        self.last_extraction = Some(outcome.clone());
        Ok(outcome)
    }

    /// Generates the dashboard posture summary. Live responses are prose,
    /// not JSON; an empty live response degrades to a fixed placeholder the
    /// way the product copy does.
    pub fn start_posture_summary(
        &mut self,
        controls: &[Control],
        current_date: &str,
    ) -> CoreResult<RunOutcome<String>> {
        self.begin("dashboard", "summary requested")?;
        self.last_summary = None;

        self.append(
            "SUMMARY_STARTED",
            "dashboard",
            Actor::User,
            json!({"controls_total": controls.len()}),
        )?;

        let outcome = match &self.strategy {
            InferenceStrategy::Stub(pacing) => {
                let delay = pacing.summary_delay;
                Self::stub_pause(delay);
                self.no_ai_mode("dashboard", "summary")?;
                RunOutcome::Completed {
                    result: stub_posture_summary(),
                }
            }
            InferenceStrategy::Live { model_id, .. } => {
                let inference = InferenceRequest::user(
                    model_id,
                    build_posture_summary_prompt(controls, current_date),
                );
                match self.model_call("dashboard", &inference)? {
                    CallResult::Failed(error) => RunOutcome::GatewayFailure { error },
                    CallResult::Text(text) => RunOutcome::Completed { result: text },
                }
            }
        };

        match &outcome {
            RunOutcome::Completed { result } => {
                let digest = sha256_hex(result.as_bytes());
                self.append(
                    "SUMMARY_COMPLETED",
                    "dashboard",
                    Actor::System,
                    json!({"summary_sha256": digest}),
                )?;
                self.finish("dashboard", RunPhase::COMPLETE, "summary completed")?;
            }
            RunOutcome::GatewayFailure { error } => {
                let reason = error.category.clone();
                self.append("SUMMARY_FAILED", "dashboard", Actor::System, json!({"reason": reason}))?;
                self.finish("dashboard", RunPhase::FAILED, "summary failed")?;
            }
            RunOutcome::Malformed { reason } => {
                let reason = reason.clone();
                self.append("SUMMARY_FAILED", "dashboard", Actor::System, json!({"reason": reason}))?;
                self.finish("dashboard", RunPhase::FAILED, "summary failed")?;
            }
        }

        self.last_summary = Some(outcome.clone());
        Ok(outcome)
    }

    /// Links evidence to a control and records the mutation. Linking is a
    /// local state change, not an inference operation; it does not touch
    /// the run phase.
    pub fn link_evidence(&mut self, item: &mut EvidenceItem, control_id: &str) -> CoreResult<()> {
        item.link_to(control_id)?;
        let details = json!({
            "evidence_id": item.id,
            "control_id": control_id,
        });
        let subject = item.id.clone();
        self.append("EVIDENCE_LINKED", &subject, Actor::User, details)
    }

    /// Opens a remediation case from a failing check and records it.
    pub fn open_case(
        &mut self,
        control: &Control,
        check: &CheckRecord,
        risk_score: u32,
        due_date: &str,
    ) -> CoreResult<Case> {
        let case = Case::from_failed_check(control, check, risk_score, due_date)?;
        self.append(
            "CASE_OPENED",
            &control.id,
            Actor::User,
            json!({
                "case_id": case.id,
                "control_id": control.id,
                "severity": format!("{:?}", case.severity),
            }),
        )?;
        Ok(case)
    }

    // Shared body of the two JSON-shaped operations: stub short-circuit,
    // single gateway call, interpretation into the typed result.
    fn run_json_operation<T, D, F, B>(
        &mut self,
        subject_id: &str,
        operation: &str,
        stub_delay: D,
        stub_result: F,
        build_request: B,
    ) -> CoreResult<RunOutcome<T>>
    where
        T: DeserializeOwned,
        D: Fn(&StubPacing) -> std::time::Duration,
        F: FnOnce() -> T,
        B: FnOnce(&str) -> InferenceRequest,
    {
        match &self.strategy {
            InferenceStrategy::Stub(pacing) => {
                let delay = stub_delay(pacing);
                Self::stub_pause(delay);
                self.no_ai_mode(subject_id, operation)?;
                Ok(RunOutcome::Completed {
                    result: stub_result(),
                })
            }
            InferenceStrategy::Live { model_id, .. } => {
                let inference = build_request(model_id);
                match self.model_call(subject_id, &inference)? {
                    CallResult::Failed(error) => Ok(RunOutcome::GatewayFailure { error }),
                    CallResult::Text(text) => match interpret_response::<T>(&text) {
                        Ok(result) => Ok(RunOutcome::Completed { result }),
                        Err(e) => Ok(RunOutcome::Malformed {
                            reason: e.to_string(),
                        }),
                    },
                }
            }
        }
    }

    // One best-effort gateway call. Empty response bodies are a gateway
    // failure, not a malformed response.
    fn model_call(
        &mut self,
        subject_id: &str,
        inference: &InferenceRequest,
    ) -> CoreResult<CallResult> {
        let call_id = call_id_ulid();
        self.append(
            "MODEL_CALL_STARTED",
            subject_id,
            Actor::System,
            json!({
                "call_id": call_id,
                "model_id": inference.model_id,
                "prompt_sha256": sha256_hex(inference.prompt.as_bytes()),
            }),
        )?;

        let InferenceStrategy::Live { client, .. } = &self.strategy else {
            return Err(CoreError::InvalidInput(
                "model_call requires the live strategy".to_string(),
            ));
        };
        let started = Instant::now();
        let result = client.generate(inference);
        let duration_ms = started.elapsed().as_millis() as u64;

        match result {
            Err(e) => {
                let error = classify_gateway_error(&e.to_string());
                self.model_call_failed(subject_id, &call_id, &error)?;
                Ok(CallResult::Failed(error))
            }
            Ok(text) if text.trim().is_empty() => {
                let error = classify_gateway_error("empty response body");
                self.model_call_failed(subject_id, &call_id, &error)?;
                Ok(CallResult::Failed(error))
            }
            Ok(text) => {
                let digest = sha256_hex(text.as_bytes());
                self.append(
                    "MODEL_CALL_COMPLETED",
                    subject_id,
                    Actor::System,
                    json!({
                        "call_id": call_id,
                        "response_sha256": digest,
                        "duration_ms": duration_ms,
                    }),
                )?;
                Ok(CallResult::Text(text))
            }
        }
    }

    fn model_call_failed(
        &mut self,
        subject_id: &str,
        call_id: &str,
        error: &GatewayError,
    ) -> CoreResult<()> {
        let details = json!({
            "call_id": call_id,
            "error_category": error.category,
            "error_code": error.code,
        });
        self.append("MODEL_CALL_FAILED", subject_id, Actor::System, details)
    }

    fn no_ai_mode(&mut self, subject_id: &str, operation: &str) -> CoreResult<()> {
        self.append(
            "NO_AI_MODE_USED",
            subject_id,
            Actor::System,
            json!({
                "reason": "inference credentials not configured",
                "operation": operation,
            }),
        )
    }

    // A second start while one operation is in flight is rejected; it does
    // not cancel or overwrite the running operation.
    fn begin(&mut self, subject_id: &str, reason: &str) -> CoreResult<()> {
        if self.phase == RunPhase::RUNNING {
            return Err(CoreError::EngineBusy(
                "an operation is already running".to_string(),
            ));
        }
        self.transition(subject_id, RunPhase::RUNNING, reason)
    }

    fn finish(&mut self, subject_id: &str, to: RunPhase, reason: &str) -> CoreResult<()> {
        self.transition(subject_id, to, reason)
    }

    fn transition(&mut self, subject_id: &str, to: RunPhase, reason: &str) -> CoreResult<()> {
        if !valid_transition(self.phase, to) {
            return Err(CoreError::InvalidTransition(format!(
                "{:?} -> {:?}",
                self.phase, to
            )));
        }
        let details = json!({
            "from_phase": format!("{:?}", self.phase),
            "to_phase": format!("{:?}", to),
            "reason": reason,
        });
        self.append("RUN_STATE_CHANGED", subject_id, Actor::System, details)?;
        self.phase = to;
        Ok(())
    }

    fn append(
        &mut self,
        event_type: &str,
        subject_id: &str,
        actor: Actor,
        details: serde_json::Value,
    ) -> CoreResult<()> {
        self.audit.append(AuditEvent {
            ts_utc: now_rfc3339_utc(),
            event_type: event_type.to_string(),
            run_id: self.run_id.clone(),
            subject_id: subject_id.to_string(),
            actor,
            details,
            prev_event_hash: String::new(),
            event_hash: String::new(),
        })?;
        Ok(())
    }

    fn stub_pause(delay: std::time::Duration) {
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}
