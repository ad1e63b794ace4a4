//! LLM integration for cad-forge.
//!
//! Defines the chat message/request/response types shared with
//! OpenAI-compatible endpoints and the `ModelClient` seam the evaluation
//! executor drives. The client owns the whole tool-using session: it submits
//! the prompt plus tool schemas, executes any tool calls the model makes, and
//! resolves to the model's final text answer.

pub mod openrouter;

pub use openrouter::OpenRouterClient;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::LlmError;
use crate::tasks::InteractionMode;
use crate::tools::Tool;

/// A message in a conversation with an LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender ("system", "user", "assistant", "tool").
    pub role: String,
    /// Text content; absent on assistant messages that only carry tool calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Tool calls requested by the assistant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCallRequest>>,
    /// The call this tool message answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// Create a tool-result message answering the given call.
    pub fn tool(content: impl Into<String>, call_id: impl Into<String>) -> Self {
        Self {
            role: "tool".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: Some(call_id.into()),
        }
    }
}

/// A tool call requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Provider-assigned call id, echoed back in the tool result message.
    pub id: String,
    /// Call type; always "function" for the endpoints used here.
    #[serde(rename = "type", default = "default_call_type")]
    pub call_type: String,
    /// The function being invoked.
    pub function: FunctionCall,
}

fn default_call_type() -> String {
    "function".to_string()
}

/// Function name plus JSON-encoded arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Name of the tool to call.
    pub name: String,
    /// Arguments as a JSON string (the wire format of OpenAI-style APIs).
    pub arguments: String,
}

/// Request payload for a chat completion.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model identifier.
    pub model: String,
    /// Conversation so far.
    pub messages: Vec<Message>,
    /// Tool definitions offered to the model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Value>>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Maximum tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Response payload of a chat completion.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    /// Generated choices.
    pub choices: Vec<Choice>,
    /// Token usage, when the provider reports it.
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// A single generated choice.
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    /// Index of this choice in the response.
    #[serde(default)]
    pub index: u32,
    /// Generated message.
    pub message: Message,
    /// Reason the generation stopped.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Token usage statistics.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Usage {
    /// Tokens in the prompt.
    #[serde(default)]
    pub prompt_tokens: u32,
    /// Tokens generated.
    #[serde(default)]
    pub completion_tokens: u32,
    /// Total tokens used.
    #[serde(default)]
    pub total_tokens: u32,
}

/// One task evaluation's model session.
#[derive(Debug, Clone)]
pub struct SessionRequest {
    /// Model identifier.
    pub model: String,
    /// The task prompt.
    pub prompt: String,
    /// Session driving mode.
    pub mode: InteractionMode,
}

/// Drives one tool-using model session to its final text answer.
///
/// Tool invocation count and ordering are owned by the client; callers only
/// see the final text or an `LlmError`.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Runs the session and resolves to the model's final text.
    async fn complete(
        &self,
        request: SessionRequest,
        tools: &[Arc<dyn Tool>],
    ) -> Result<String, LlmError>;
}
