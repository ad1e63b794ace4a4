//! Validation pipeline for task outputs.
//!
//! Converts a task's raw output directory into a structured pass/fail result
//! by running a strict linear sequence of checks: the declared artifact must
//! exist, then each declared camera view must both render successfully and
//! actually produce its output file on disk. Fail-fast, no retry.
//!
//! The two-tier check per view (process exit status, then file existence)
//! defends against a renderer that exits zero without writing output.

use std::path::Path;

use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::render::Renderer;
use crate::tasks::TaskDescriptor;

use super::result::{FailureKind, TaskResult};

/// Validates one task's output directory against its declared outputs.
pub struct Verifier<'a> {
    task: &'a TaskDescriptor,
}

impl<'a> Verifier<'a> {
    /// Creates a verifier for a task.
    pub fn new(task: &'a TaskDescriptor) -> Self {
        Self { task }
    }

    /// Runs the validation state machine.
    ///
    /// Expected failures (`MissingArtifact`, `RenderFailed`, `OutputMissing`)
    /// are returned as data; only unexpected filesystem faults while probing
    /// existence surface as `io::Error`.
    pub async fn verify(
        &self,
        renderer: &dyn Renderer,
        output_dir: &Path,
    ) -> std::io::Result<TaskResult> {
        let task_name = self.task.name.as_str();
        let artifact_path = output_dir.join(&self.task.output.artifact);

        info!(task = %task_name, dir = %output_dir.display(), "Validating output");

        if !artifact_path.try_exists()? {
            return Ok(TaskResult::failed(
                task_name,
                FailureKind::MissingArtifact,
                format!(
                    "expected artifact '{}' was not created",
                    self.task.output.artifact
                ),
                output_dir,
                Map::new(),
            ));
        }

        let mut metadata = Map::new();
        let mut output_paths = Vec::new();

        for view in &self.task.output.views {
            let output_file = output_dir.join(view.output_file_name(task_name));

            let outcome = match renderer.render(&artifact_path, &output_file, view).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    metadata.insert(
                        view.metadata_key(),
                        json!({ "success": false, "error": e.to_string() }),
                    );
                    return Ok(TaskResult::failed(
                        task_name,
                        FailureKind::RenderFailed,
                        format!("renderer failed to start for view '{}': {}", view.name, e),
                        output_dir,
                        metadata,
                    ));
                }
            };

            debug!(
                task = %task_name,
                view = %view.name,
                exit_code = outcome.exit_code,
                "Render finished"
            );

            metadata.insert(
                view.metadata_key(),
                json!({
                    "success": outcome.is_success(),
                    "stdout": outcome.stdout,
                    "stderr": outcome.stderr,
                }),
            );

            if !outcome.is_success() {
                return Ok(TaskResult::failed(
                    task_name,
                    FailureKind::RenderFailed,
                    format!(
                        "render failed for view '{}' (exit code {})",
                        view.name, outcome.exit_code
                    ),
                    output_dir,
                    metadata,
                ));
            }

            if !output_file.try_exists()? {
                return Ok(TaskResult::failed(
                    task_name,
                    FailureKind::OutputMissing,
                    format!(
                        "render reported success for view '{}' but '{}' was not written",
                        view.name,
                        output_file.display()
                    ),
                    output_dir,
                    metadata,
                ));
            }

            output_paths.push(output_file.display().to_string());
        }

        metadata.insert(
            "artifact".to_string(),
            Value::String(artifact_path.display().to_string()),
        );
        metadata.insert("outputs".to_string(), json!(output_paths));

        info!(task = %task_name, "Validation passed");
        Ok(TaskResult::passed(task_name, output_dir, metadata))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{CameraView, RenderError, RenderOutput};
    use crate::tasks::{InteractionMode, OutputSpec};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Renderer double that records every invocation and follows a script:
    /// exit non-zero for one view, or claim success without writing output.
    struct ScriptedRenderer {
        calls: Mutex<Vec<String>>,
        fail_view: Option<String>,
        skip_write_view: Option<String>,
    }

    impl ScriptedRenderer {
        fn passing() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_view: None,
                skip_write_view: None,
            }
        }

        fn failing_on(view: &str) -> Self {
            Self {
                fail_view: Some(view.to_string()),
                ..Self::passing()
            }
        }

        fn lying_on(view: &str) -> Self {
            Self {
                skip_write_view: Some(view.to_string()),
                ..Self::passing()
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Renderer for ScriptedRenderer {
        async fn render(
            &self,
            _source: &Path,
            output: &Path,
            view: &CameraView,
        ) -> Result<RenderOutput, RenderError> {
            self.calls.lock().unwrap().push(view.name.clone());

            if self.fail_view.as_deref() == Some(view.name.as_str()) {
                return Ok(RenderOutput {
                    exit_code: 1,
                    stdout: String::new(),
                    stderr: format!("ERROR: cannot render {}", view.name),
                });
            }
            if self.skip_write_view.as_deref() != Some(view.name.as_str()) {
                std::fs::write(output, b"png")?;
            }
            Ok(RenderOutput {
                exit_code: 0,
                stdout: "Rendering finished".to_string(),
                stderr: String::new(),
            })
        }
    }

    fn two_view_task() -> TaskDescriptor {
        TaskDescriptor::new(
            "bracket",
            "A bracket",
            "Model a bracket",
            InteractionMode::SingleExchange,
            OutputSpec::new(
                "bracket.scad",
                vec![
                    CameraView::named("default"),
                    CameraView::named("bottom-isometric").with_rotation([225.0, 0.0, 45.0]),
                ],
            ),
        )
    }

    fn write_artifact(dir: &Path) {
        std::fs::write(dir.join("bracket.scad"), "cube([40, 40, 5]);").unwrap();
    }

    #[tokio::test]
    async fn test_missing_artifact_renders_nothing() {
        let temp = TempDir::new().unwrap();
        let task = two_view_task();
        let renderer = ScriptedRenderer::passing();

        let result = Verifier::new(&task)
            .verify(&renderer, temp.path())
            .await
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.failure, Some(FailureKind::MissingArtifact));
        assert_eq!(renderer.call_count(), 0);
        assert!(result.metadata.is_empty());
    }

    #[tokio::test]
    async fn test_all_views_pass() {
        let temp = TempDir::new().unwrap();
        write_artifact(temp.path());
        let task = two_view_task();
        let renderer = ScriptedRenderer::passing();

        let result = Verifier::new(&task)
            .verify(&renderer, temp.path())
            .await
            .unwrap();

        assert!(result.success, "error: {:?}", result.error);
        assert_eq!(renderer.call_count(), 2);
        assert!(result.metadata.contains_key("defaultView"));
        assert!(result.metadata.contains_key("bottomView"));
        assert!(result.metadata.contains_key("artifact"));
        assert_eq!(result.metadata["outputs"].as_array().unwrap().len(), 2);
        assert_eq!(result.metadata["defaultView"]["stdout"], "Rendering finished");
    }

    #[tokio::test]
    async fn test_first_view_failure_skips_second() {
        let temp = TempDir::new().unwrap();
        write_artifact(temp.path());
        let task = two_view_task();
        let renderer = ScriptedRenderer::failing_on("default");

        let result = Verifier::new(&task)
            .verify(&renderer, temp.path())
            .await
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.failure, Some(FailureKind::RenderFailed));
        assert!(result.error.as_deref().unwrap().contains("default"));
        assert_eq!(renderer.call_count(), 1);
        assert!(result.metadata.contains_key("defaultView"));
        assert!(!result.metadata.contains_key("bottomView"));
    }

    #[tokio::test]
    async fn test_second_view_failure_keeps_first_stage_metadata() {
        let temp = TempDir::new().unwrap();
        write_artifact(temp.path());
        let task = two_view_task();
        let renderer = ScriptedRenderer::failing_on("bottom-isometric");

        let result = Verifier::new(&task)
            .verify(&renderer, temp.path())
            .await
            .unwrap();

        assert!(!result.success);
        assert_eq!(renderer.call_count(), 2);
        assert_eq!(result.metadata["defaultView"]["success"], true);
        assert_eq!(result.metadata["bottomView"]["success"], false);
        assert!(result.metadata["bottomView"]["stderr"]
            .as_str()
            .unwrap()
            .contains("bottom-isometric"));
    }

    #[tokio::test]
    async fn test_renderer_lying_is_output_missing() {
        let temp = TempDir::new().unwrap();
        write_artifact(temp.path());
        let task = two_view_task();
        let renderer = ScriptedRenderer::lying_on("default");

        let result = Verifier::new(&task)
            .verify(&renderer, temp.path())
            .await
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.failure, Some(FailureKind::OutputMissing));
        // Distinct from an exit-status failure: the render stage itself passed.
        assert_eq!(result.metadata["defaultView"]["success"], true);
        assert_eq!(renderer.call_count(), 1);
    }
}
