//! OpenRouter-backed model client.
//!
//! OpenRouter exposes many providers behind one OpenAI-compatible endpoint,
//! which is what makes the model×task mesh practical: the same client drives
//! every configured model identifier.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::LlmError;
use crate::tasks::InteractionMode;
use crate::tools::{tool_schemas, Tool};

use super::{ChatRequest, ChatResponse, Message, ModelClient, SessionRequest, ToolCallRequest};

/// Default OpenRouter API endpoint.
const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Default cap on tool rounds for multi-turn sessions.
const DEFAULT_MAX_ROUNDS: usize = 8;

/// Structured error body returned by the API.
#[derive(Debug, serde::Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, serde::Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Model client routed through OpenRouter's chat completions API.
pub struct OpenRouterClient {
    /// HTTP client for making API requests.
    client: Client,
    /// API key for authentication.
    api_key: String,
    /// Base URL for the API.
    base_url: String,
    /// Round cap for multi-turn sessions.
    max_rounds: usize,
    /// Sampling temperature.
    temperature: f64,
    /// Response token cap.
    max_tokens: u32,
}

impl OpenRouterClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client - system TLS configuration error"),
            api_key: api_key.into(),
            base_url: OPENROUTER_BASE_URL.to_string(),
            max_rounds: DEFAULT_MAX_ROUNDS,
            temperature: 0.2,
            max_tokens: 4096,
        }
    }

    /// Overrides the base URL. Useful for OpenRouter-compatible proxies and
    /// tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the multi-turn tool round cap.
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds.max(1);
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Executes one chat completion request.
    async fn execute(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);

        let http_response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("HTTP-Referer", "https://cad-forge.local")
            .header("X-Title", "cad-forge")
            .json(request)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        let status = http_response.status();

        if !status.is_success() {
            let status_code = status.as_u16();
            let error_text = http_response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());

            if let Ok(error_response) = serde_json::from_str::<ApiErrorResponse>(&error_text) {
                if status_code == 429 {
                    return Err(LlmError::RateLimited(error_response.error.message));
                }
                return Err(LlmError::ApiError {
                    code: status_code,
                    message: error_response.error.message,
                });
            }

            return Err(LlmError::ApiError {
                code: status_code,
                message: error_text,
            });
        }

        http_response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(format!("Failed to parse API response: {}", e)))
    }

    /// Executes one tool call and formats the outcome for the model.
    ///
    /// Every failure mode, including a sandbox path escape, comes back as
    /// message content so the model can correct itself within the session.
    async fn dispatch(&self, call: &ToolCallRequest, tools: &[Arc<dyn Tool>]) -> String {
        let Some(tool) = tools.iter().find(|t| t.name() == call.function.name) else {
            warn!(tool = %call.function.name, "Model requested unknown tool");
            return format!("ERROR: unknown tool '{}'", call.function.name);
        };

        let args: serde_json::Value = match serde_json::from_str(&call.function.arguments) {
            Ok(value) => value,
            Err(e) => return format!("ERROR: invalid tool arguments: {}", e),
        };

        match tool.execute(args).await {
            Ok(result) if result.success => result.output,
            Ok(result) => format!(
                "ERROR: {}",
                result.error.unwrap_or_else(|| "tool failed".to_string())
            ),
            Err(e) => format!("ERROR: {}", e),
        }
    }
}

#[async_trait]
impl ModelClient for OpenRouterClient {
    async fn complete(
        &self,
        request: SessionRequest,
        tools: &[Arc<dyn Tool>],
    ) -> Result<String, LlmError> {
        let schemas = tool_schemas(tools);
        let round_limit = match request.mode {
            InteractionMode::SingleExchange => 1,
            InteractionMode::MultiTurn => self.max_rounds,
        };

        let mut messages = vec![Message::user(request.prompt.clone())];
        let mut rounds = 0usize;

        loop {
            let chat = ChatRequest {
                model: request.model.clone(),
                messages: messages.clone(),
                tools: (!schemas.is_empty()).then(|| schemas.clone()),
                temperature: Some(self.temperature),
                max_tokens: Some(self.max_tokens),
            };

            let response = self.execute(&chat).await?;
            let choice = response
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| LlmError::ParseError("response contained no choices".to_string()))?;

            let message = choice.message;
            let calls = message.tool_calls.clone().unwrap_or_default();

            if calls.is_empty() {
                return message
                    .content
                    .filter(|text| !text.trim().is_empty())
                    .ok_or(LlmError::EmptyResponse);
            }

            if rounds >= round_limit {
                return Err(LlmError::RoundLimitExceeded { limit: round_limit });
            }
            rounds += 1;

            debug!(
                model = %request.model,
                round = rounds,
                calls = calls.len(),
                "Executing tool calls"
            );

            messages.push(message);
            for call in &calls {
                let content = self.dispatch(call, tools).await;
                messages.push(Message::tool(content, call.id.clone()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let client = OpenRouterClient::new("sk-test");
        assert_eq!(client.base_url, OPENROUTER_BASE_URL);
        assert_eq!(client.max_rounds, DEFAULT_MAX_ROUNDS);
    }

    #[test]
    fn test_max_rounds_floor_is_one() {
        let client = OpenRouterClient::new("sk-test").with_max_rounds(0);
        assert_eq!(client.max_rounds, 1);
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool_is_reported_as_content() {
        let client = OpenRouterClient::new("sk-test");
        let call = ToolCallRequest {
            id: "call_1".to_string(),
            call_type: "function".to_string(),
            function: crate::llm::FunctionCall {
                name: "launch_missiles".to_string(),
                arguments: "{}".to_string(),
            },
        };
        let content = client.dispatch(&call, &[]).await;
        assert!(content.contains("unknown tool"));
    }
}
