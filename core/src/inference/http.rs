use crate::error::{CoreError, CoreResult};
use crate::inference::interface::{enforce_endpoint_scheme, InferenceClient, InferenceRequest};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub endpoint: String,
    pub api_key: String,
    pub timeout_ms: u64,
    pub user_agent: String,
}

/// Client for the hosted generative-language `generateContent` API.
/// Single best-effort call per request; the configured timeout is the
/// caller-side cancellation policy.
#[derive(Debug)]
pub struct HttpInferenceClient {
    config: HttpClientConfig,
    client: reqwest::blocking::Client,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl HttpInferenceClient {
    pub fn new(config: HttpClientConfig) -> CoreResult<Self> {
        enforce_endpoint_scheme(&config.endpoint)?;
        if config.api_key.trim().is_empty() {
            return Err(CoreError::GatewayConfig(
                "api key must not be empty".to_string(),
            ));
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| CoreError::GatewayConfig(format!("http client build failed: {}", e)))?;
        Ok(Self { config, client })
    }

    fn generate_url(&self, model_id: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.endpoint.trim_end_matches('/'),
            model_id,
            self.config.api_key
        )
    }
}

impl InferenceClient for HttpInferenceClient {
    fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    fn generate(&self, req: &InferenceRequest) -> CoreResult<String> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: req.role.clone(),
                parts: vec![Part {
                    text: req.prompt.clone(),
                }],
            }],
        };
        let response = self
            .client
            .post(self.generate_url(&req.model_id))
            .json(&body)
            .send()
            .map_err(|e| CoreError::InvalidInput(format!("network failure: {}", e)))?;
        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::InvalidInput(format!(
                "unexpected status {}",
                status.as_u16()
            )));
        }
        let parsed: GenerateContentResponse = response
            .json()
            .map_err(|e| CoreError::InvalidInput(format!("response body decode failed: {}", e)))?;
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();
        Ok(text)
    }
}
