use crate::error::CoreResult;
use crate::inference::http::{HttpClientConfig, HttpInferenceClient};
use crate::inference::interface::InferenceClient;
use crate::inference::stub::StubPacing;

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL_ID: &str = "gemini-3-flash-preview";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Process configuration for the inference gateway. Credential presence
/// selects the live strategy; absence selects the deterministic stub.
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model_id: String,
    pub timeout_ms: u64,
    pub pacing: StubPacing,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            pacing: StubPacing::default(),
        }
    }
}

impl InferenceConfig {
    /// Reads credentials afresh; selection is not cached process-wide.
    pub fn from_env() -> Self {
        let api_key = std::env::var("TRUSTOS_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .ok()
            .filter(|k| !k.trim().is_empty());
        Self {
            api_key,
            ..Self::default()
        }
    }

    pub fn strategy(&self) -> CoreResult<InferenceStrategy> {
        match &self.api_key {
            Some(key) => {
                let client = HttpInferenceClient::new(HttpClientConfig {
                    endpoint: self.endpoint.clone(),
                    api_key: key.clone(),
                    timeout_ms: self.timeout_ms,
                    user_agent: format!("trustos-core/{}", env!("CARGO_PKG_VERSION")),
                })?;
                Ok(InferenceStrategy::Live {
                    client: Box::new(client),
                    model_id: self.model_id.clone(),
                })
            }
            None => Ok(InferenceStrategy::Stub(self.pacing)),
        }
    }
}

/// A configured key means every call goes to the live gateway (no stub
/// fallback on failure); no key means the designed stub path.
pub enum InferenceStrategy {
    Live {
        client: Box<dyn InferenceClient>,
        model_id: String,
    },
    Stub(StubPacing),
}

impl InferenceStrategy {
    pub fn live(client: Box<dyn InferenceClient>, model_id: &str) -> Self {
        Self::Live {
            client,
            model_id: model_id.to_string(),
        }
    }

    pub fn is_stub(&self) -> bool {
        matches!(self, Self::Stub(_))
    }
}
