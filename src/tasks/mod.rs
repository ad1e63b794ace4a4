//! Task descriptors and the task registry.
//!
//! A task is a named, versioned unit of evaluatable work: the prompt sent to
//! the model, the interaction mode, the capability set bound to a working
//! directory at execution time, and the declared outputs the validation
//! pipeline checks for.

pub mod catalog;
pub mod registry;

pub use registry::TaskRegistry;

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::render::{CameraView, Renderer};
use crate::runner::result::TaskResult;
use crate::runner::sandbox::ArtifactStore;
use crate::runner::verifier::Verifier;
use crate::tools::{ReadFileTool, Tool, WriteFileTool};

/// How the model session is driven for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionMode {
    /// One round of tool execution, then the model must answer.
    SingleExchange,
    /// Tool rounds repeat up to the client's configured limit.
    MultiTurn,
}

impl std::fmt::Display for InteractionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InteractionMode::SingleExchange => write!(f, "single_exchange"),
            InteractionMode::MultiTurn => write!(f, "multi_turn"),
        }
    }
}

/// Declared outputs of a task: the artifact the model must create and the
/// camera views the renderer is invoked with, in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSpec {
    /// Source file the model is expected to write, relative to the workspace.
    pub artifact: String,
    /// Camera views rendered from the artifact, in declared order.
    pub views: Vec<CameraView>,
}

impl OutputSpec {
    /// Creates an output spec.
    pub fn new(artifact: impl Into<String>, views: Vec<CameraView>) -> Self {
        Self {
            artifact: artifact.into(),
            views,
        }
    }
}

/// A named unit of evaluatable work.
///
/// Descriptors are immutable once registered; the working-directory binding
/// happens only at execution time so the same descriptor is reused across
/// runs without leaking state between them.
#[derive(Debug, Clone)]
pub struct TaskDescriptor {
    /// Unique, stable task name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Instruction text sent to the model.
    pub prompt: String,
    /// Session driving mode.
    pub interaction_mode: InteractionMode,
    /// Declared artifact and render views.
    pub output: OutputSpec,
}

impl TaskDescriptor {
    /// Creates a descriptor.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        prompt: impl Into<String>,
        interaction_mode: InteractionMode,
        output: OutputSpec,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            prompt: prompt.into(),
            interaction_mode,
            output,
        }
    }

    /// Instantiates the task's capability set bound to a working directory.
    ///
    /// The sandboxed store created here is the only path by which the model
    /// can touch disk.
    pub fn tools(&self, working_dir: &Path) -> Vec<Arc<dyn Tool>> {
        let store = Arc::new(ArtifactStore::new(working_dir));
        vec![
            Arc::new(WriteFileTool::new(Arc::clone(&store))),
            Arc::new(ReadFileTool::new(store)),
        ]
    }

    /// Runs the validation pipeline against an output directory.
    ///
    /// Expected failures come back as data inside the `TaskResult`; only
    /// unexpected filesystem faults while probing surface as `io::Error`.
    pub async fn validate(
        &self,
        renderer: &dyn Renderer,
        output_dir: &Path,
    ) -> std::io::Result<TaskResult> {
        Verifier::new(self).verify(renderer, output_dir).await
    }

    /// Checks the descriptor carries every required field.
    ///
    /// Registration skips malformed descriptors instead of failing the
    /// whole registry.
    pub fn is_well_formed(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.description.trim().is_empty()
            && !self.prompt.trim().is_empty()
            && !self.output.artifact.trim().is_empty()
            && !self.output.views.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> TaskDescriptor {
        TaskDescriptor::new(
            "widget",
            "A test widget",
            "Model a widget",
            InteractionMode::SingleExchange,
            OutputSpec::new("widget.scad", vec![CameraView::named("default")]),
        )
    }

    #[test]
    fn test_well_formed_descriptor() {
        assert!(descriptor().is_well_formed());
    }

    #[test]
    fn test_missing_fields_are_malformed() {
        let mut task = descriptor();
        task.prompt = String::new();
        assert!(!task.is_well_formed());

        let mut task = descriptor();
        task.output.views.clear();
        assert!(!task.is_well_formed());
    }

    #[test]
    fn test_tools_are_bound_per_invocation() {
        let task = descriptor();
        let tools = task.tools(Path::new("/tmp/run-a/widget"));
        let names: Vec<&str> = tools.iter().map(|t| t.name()).collect();
        assert!(names.contains(&"write_file"));
        assert!(names.contains(&"read_file"));
    }

    #[test]
    fn test_interaction_mode_display() {
        assert_eq!(InteractionMode::SingleExchange.to_string(), "single_exchange");
        assert_eq!(InteractionMode::MultiTurn.to_string(), "multi_turn");
    }
}
