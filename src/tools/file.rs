//! Sandboxed file tools offered to the model.
//!
//! Both tools delegate every filesystem touch to the run's `ArtifactStore`,
//! so a generated path can never land outside the task's output directory.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Tool, ToolError, ToolResult};
use crate::runner::sandbox::ArtifactStore;

/// Parameters for the write_file tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WriteFileParams {
    /// Path to the file to write, relative to the task workspace.
    path: String,
    /// Content to write to the file.
    content: String,
}

/// Tool for creating or overwriting files in the task workspace.
pub struct WriteFileTool {
    store: Arc<ArtifactStore>,
}

impl WriteFileTool {
    /// Create a write tool bound to the given store.
    pub fn new(store: Arc<ArtifactStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Create or overwrite a file in the task workspace with the specified content. \
         Paths are relative to the workspace; parent directories are created as needed."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Relative path of the file to write"
                },
                "content": {
                    "type": "string",
                    "description": "Content to write to the file"
                }
            },
            "required": ["path", "content"]
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let params: WriteFileParams = serde_json::from_value(args)
            .map_err(|e| ToolError::InvalidParameters(format!("Invalid parameters: {}", e)))?;

        if params.path.trim().is_empty() {
            return Err(ToolError::InvalidParameters(
                "Path cannot be empty".to_string(),
            ));
        }

        match self.store.write(&params.path, &params.content) {
            Ok(bytes) => Ok(ToolResult::success(format!(
                "Successfully wrote {} bytes to {}",
                bytes, params.path
            ))),
            Err(e) => Ok(ToolResult::failure(e.to_string())),
        }
    }
}

/// Parameters for the read_file tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ReadFileParams {
    /// Path to the file to read, relative to the task workspace.
    path: String,
}

/// Tool for reading file contents from the task workspace.
pub struct ReadFileTool {
    store: Arc<ArtifactStore>,
}

impl ReadFileTool {
    /// Create a read tool bound to the given store.
    pub fn new(store: Arc<ArtifactStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read the full contents of a file in the task workspace."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Relative path of the file to read"
                }
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let params: ReadFileParams = serde_json::from_value(args)
            .map_err(|e| ToolError::InvalidParameters(format!("Invalid parameters: {}", e)))?;

        if params.path.trim().is_empty() {
            return Err(ToolError::InvalidParameters(
                "Path cannot be empty".to_string(),
            ));
        }

        match self.store.read(&params.path) {
            Ok(content) => Ok(ToolResult::success(content)),
            Err(e) => Ok(ToolResult::failure(e.to_string())),
        }
    }
}
