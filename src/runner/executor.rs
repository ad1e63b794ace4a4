//! Single-evaluation executor.
//!
//! Drives one (model, task) pair end to end: prepares the output directory,
//! runs the model session with the task's sandboxed tools, then hands the
//! directory to the validation pipeline. This is the fail-fast boundary for
//! everything outside the pipeline's structured failures: a client or setup
//! error becomes a failed `TaskResult`, never a panic or propagated error.

use std::path::Path;
use std::sync::Arc;

use serde_json::Map;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::llm::{ModelClient, SessionRequest};
use crate::render::Renderer;
use crate::tasks::TaskDescriptor;

use super::result::{FailureKind, TaskResult};

/// Executes one (model, task) evaluation.
pub struct Executor {
    client: Arc<dyn ModelClient>,
    renderer: Arc<dyn Renderer>,
}

impl Executor {
    /// Creates an executor over the given client and renderer.
    pub fn new(client: Arc<dyn ModelClient>, renderer: Arc<dyn Renderer>) -> Self {
        Self { client, renderer }
    }

    /// Runs the evaluation and returns the validation pipeline's result
    /// unchanged, or a boundary failure converted to a `TaskResult`.
    pub async fn run(&self, model: &str, task: &TaskDescriptor, output_dir: &Path) -> TaskResult {
        info!(
            model,
            task = %task.name,
            dir = %output_dir.display(),
            "Starting evaluation"
        );

        if let Err(e) = std::fs::create_dir_all(output_dir) {
            return TaskResult::failed(
                task.name.as_str(),
                FailureKind::Setup,
                format!("Failed to create output directory: {}", e),
                output_dir,
                Map::new(),
            );
        }

        let tools = task.tools(output_dir);
        let request = SessionRequest {
            model: model.to_string(),
            prompt: task.prompt.clone(),
            mode: task.interaction_mode,
        };

        let response_text = match self.client.complete(request, &tools).await {
            Ok(text) => text,
            Err(e) => {
                error!(model, task = %task.name, error = %e, "Model call failed");
                return TaskResult::failed(
                    task.name.as_str(),
                    FailureKind::ModelInvocation,
                    e.to_string(),
                    output_dir,
                    Map::new(),
                );
            }
        };

        debug!(
            task = %task.name,
            chars = response_text.len(),
            files = ?list_artifacts(output_dir),
            "Model session finished"
        );
        if let Err(e) = std::fs::write(output_dir.join("response.md"), &response_text) {
            warn!(task = %task.name, "Failed to save model response: {}", e);
        }

        let result = match task.validate(self.renderer.as_ref(), output_dir).await {
            Ok(result) => result,
            Err(e) => TaskResult::failed(
                task.name.as_str(),
                FailureKind::Setup,
                format!("Validation probe failed: {}", e),
                output_dir,
                Map::new(),
            ),
        };

        self.save_result(&result, output_dir);
        result
    }

    /// Persists the result alongside the run artifacts, best effort.
    fn save_result(&self, result: &TaskResult, output_dir: &Path) {
        let path = output_dir.join("result.json");
        match serde_json::to_string_pretty(result) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    warn!(path = %path.display(), "Failed to save result: {}", e);
                } else {
                    debug!(path = %path.display(), "Saved result");
                }
            }
            Err(e) => warn!("Failed to serialize result: {}", e),
        }
    }
}

/// Lists files present in the output directory, relative to it.
fn list_artifacts(output_dir: &Path) -> Vec<String> {
    WalkDir::new(output_dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            entry
                .path()
                .strip_prefix(output_dir)
                .ok()
                .map(|rel| rel.to_string_lossy().to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::llm::SessionRequest;
    use crate::render::{CameraView, RenderError, RenderOutput};
    use crate::tasks::{InteractionMode, OutputSpec};
    use crate::tools::Tool;
    use async_trait::async_trait;
    use tempfile::TempDir;

    /// Client double: writes the scripted artifact through the task's own
    /// write tool, or fails the call outright.
    struct ScriptedClient {
        artifact: Option<(String, String)>,
        error: Option<String>,
    }

    #[async_trait]
    impl ModelClient for ScriptedClient {
        async fn complete(
            &self,
            _request: SessionRequest,
            tools: &[Arc<dyn Tool>],
        ) -> Result<String, LlmError> {
            if let Some(message) = &self.error {
                return Err(LlmError::RequestFailed(message.clone()));
            }
            if let Some((path, content)) = &self.artifact {
                let write = tools
                    .iter()
                    .find(|t| t.name() == "write_file")
                    .expect("write_file tool is bound");
                let result = write
                    .execute(serde_json::json!({ "path": path, "content": content }))
                    .await
                    .expect("valid parameters");
                assert!(result.success);
            }
            Ok("Done.".to_string())
        }
    }

    struct TouchRenderer;

    #[async_trait]
    impl Renderer for TouchRenderer {
        async fn render(
            &self,
            _source: &Path,
            output: &Path,
            _view: &CameraView,
        ) -> Result<RenderOutput, RenderError> {
            std::fs::write(output, b"png")?;
            Ok(RenderOutput {
                exit_code: 0,
                stdout: String::new(),
                stderr: String::new(),
            })
        }
    }

    fn task() -> TaskDescriptor {
        TaskDescriptor::new(
            "widget",
            "A widget",
            "Model a widget",
            InteractionMode::SingleExchange,
            OutputSpec::new("widget.scad", vec![CameraView::named("default")]),
        )
    }

    #[tokio::test]
    async fn test_successful_run_persists_result() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("widget");
        let client = Arc::new(ScriptedClient {
            artifact: Some(("widget.scad".to_string(), "cube(5);".to_string())),
            error: None,
        });
        let executor = Executor::new(client, Arc::new(TouchRenderer));

        let result = executor.run("m1", &task(), &out).await;

        assert!(result.success, "error: {:?}", result.error);
        assert!(out.join("result.json").exists());
        assert!(out.join("response.md").exists());
    }

    #[tokio::test]
    async fn test_client_error_becomes_failed_result() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("widget");
        let client = Arc::new(ScriptedClient {
            artifact: None,
            error: Some("connection reset".to_string()),
        });
        let executor = Executor::new(client, Arc::new(TouchRenderer));

        let result = executor.run("m1", &task(), &out).await;

        assert!(!result.success);
        assert_eq!(result.failure, Some(FailureKind::ModelInvocation));
        assert!(result.error.as_deref().unwrap().contains("connection reset"));
        assert!(result.metadata.is_empty());
        // The directory was still created before the call failed.
        assert!(out.exists());
    }

    #[tokio::test]
    async fn test_model_writing_nothing_is_missing_artifact() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("widget");
        let client = Arc::new(ScriptedClient {
            artifact: None,
            error: None,
        });
        let executor = Executor::new(client, Arc::new(TouchRenderer));

        let result = executor.run("m1", &task(), &out).await;

        assert!(!result.success);
        assert_eq!(result.failure, Some(FailureKind::MissingArtifact));
    }

    #[test]
    fn test_list_artifacts_relative_paths() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("sub")).unwrap();
        std::fs::write(temp.path().join("a.scad"), "x").unwrap();
        std::fs::write(temp.path().join("sub/b.png"), "y").unwrap();

        let mut files = list_artifacts(temp.path());
        files.sort();
        assert_eq!(files, vec!["a.scad".to_string(), "sub/b.png".to_string()]);
    }
}
