//! Tool definitions for model capability sets.
//!
//! This module defines the `Tool` trait describing a capability the LLM can
//! invoke during an evaluation, plus the JSON schema shape expected by
//! function-calling APIs.

pub mod file;

pub use file::{ReadFileTool, WriteFileTool};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during tool execution.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Invalid parameters provided to the tool.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
}

/// Result of a tool execution.
///
/// Failures are carried as data so a misbehaving model generation can be
/// corrected within the same session rather than aborting the evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether the tool execution was successful.
    pub success: bool,
    /// Output from the tool execution.
    pub output: String,
    /// Error message if execution failed.
    pub error: Option<String>,
}

impl ToolResult {
    /// Create a successful tool result.
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            error: None,
        }
    }

    /// Create a failed tool result.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: String::new(),
            error: Some(error.into()),
        }
    }
}

/// Trait for tools that can be executed on behalf of the model.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the unique name of the tool.
    fn name(&self) -> &str;

    /// Returns a description of what the tool does.
    fn description(&self) -> &str;

    /// Returns the JSON schema for the tool's parameters.
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with the given arguments.
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError>;
}

/// Generates function-calling definitions for a capability set.
pub fn tool_schemas(tools: &[Arc<dyn Tool>]) -> Vec<Value> {
    tools
        .iter()
        .map(|tool| {
            serde_json::json!({
                "type": "function",
                "function": {
                    "name": tool.name(),
                    "description": tool.description(),
                    "parameters": tool.parameters_schema()
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::sandbox::ArtifactStore;

    #[test]
    fn test_tool_result_success() {
        let result = ToolResult::success("output text");
        assert!(result.success);
        assert_eq!(result.output, "output text");
        assert!(result.error.is_none());
    }

    #[test]
    fn test_tool_result_failure() {
        let result = ToolResult::failure("error message");
        assert!(!result.success);
        assert!(result.output.is_empty());
        assert_eq!(result.error, Some("error message".to_string()));
    }

    #[test]
    fn test_tool_schemas_shape() {
        let store = Arc::new(ArtifactStore::new("/tmp/sandbox"));
        let tools: Vec<Arc<dyn Tool>> = vec![
            Arc::new(WriteFileTool::new(Arc::clone(&store))),
            Arc::new(ReadFileTool::new(store)),
        ];

        let schemas = tool_schemas(&tools);
        assert_eq!(schemas.len(), 2);
        for schema in &schemas {
            assert_eq!(schema["type"], "function");
            assert!(schema["function"]["name"].is_string());
            assert!(schema["function"]["description"].is_string());
            assert!(schema["function"]["parameters"].is_object());
        }
    }
}
