use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InferenceRequest {
    pub model_id: String,
    pub role: String,
    pub prompt: String,
}

impl InferenceRequest {
    pub fn user(model_id: &str, prompt: String) -> Self {
        Self {
            model_id: model_id.to_string(),
            role: "user".to_string(),
            prompt,
        }
    }
}

/// Opaque external text-generation collaborator. One-shot request/response,
/// no retries, no rate limiting; the caller decides fallback behavior.
pub trait InferenceClient {
    fn endpoint(&self) -> &str;
    fn generate(&self, req: &InferenceRequest) -> CoreResult<String>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GatewayError {
    pub code: String,
    pub message: String,
    pub retryable: bool,
    pub category: String, // MISSING_CREDENTIALS|NETWORK|HTTP_STATUS|EMPTY_RESPONSE|TIMEOUT|RUNTIME_ERROR
}

pub fn classify_gateway_error(err: &str) -> GatewayError {
    let lower = err.to_ascii_lowercase();
    let (category, code, retryable) = if lower.contains("timeout") || lower.contains("timed out") {
        ("TIMEOUT", "GATEWAY_TIMEOUT", true)
    } else if lower.contains("credential") || lower.contains("api key") {
        ("MISSING_CREDENTIALS", "MISSING_CREDENTIALS", false)
    } else if lower.contains("status") {
        ("HTTP_STATUS", "NON_2XX_RESPONSE", false)
    } else if lower.contains("empty response") {
        ("EMPTY_RESPONSE", "EMPTY_RESPONSE", false)
    } else if lower.contains("connect") || lower.contains("dns") || lower.contains("network") {
        ("NETWORK", "NETWORK_FAILURE", true)
    } else {
        ("RUNTIME_ERROR", "RUNTIME_ERROR", false)
    };
    GatewayError {
        code: code.to_string(),
        message: err.to_string(),
        retryable,
        category: category.to_string(),
    }
}

/// Endpoints must be https; cleartext http is tolerated for loopback only
/// (local test servers).
pub fn enforce_endpoint_scheme(endpoint: &str) -> CoreResult<()> {
    let url = Url::parse(endpoint)
        .map_err(|e| CoreError::GatewayConfig(format!("endpoint not a valid URL: {}", e)))?;
    match url.scheme() {
        "https" => Ok(()),
        "http" => {
            let host = url.host_str().unwrap_or_default();
            if host == "127.0.0.1" || host == "localhost" || host == "[::1]" {
                Ok(())
            } else {
                Err(CoreError::GatewayConfig(
                    "cleartext endpoint rejected: http is loopback-only".to_string(),
                ))
            }
        }
        other => Err(CoreError::GatewayConfig(format!(
            "unsupported endpoint scheme: {}",
            other
        ))),
    }
}
