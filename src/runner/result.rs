//! Results for task validations and mesh runs.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Classification of a failed evaluation.
///
/// The three validation kinds mirror the pipeline's terminal failure states;
/// `Setup` and `ModelInvocation` are the executor's own boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The declared source artifact was never created.
    MissingArtifact,
    /// The renderer exited non-zero for a view.
    RenderFailed,
    /// The renderer claimed success but the view's output file is absent.
    OutputMissing,
    /// The provider client failed before validation could run.
    ModelInvocation,
    /// Directory creation or an unexpected filesystem fault.
    Setup,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::MissingArtifact => write!(f, "missing_artifact"),
            FailureKind::RenderFailed => write!(f, "render_failed"),
            FailureKind::OutputMissing => write!(f, "output_missing"),
            FailureKind::ModelInvocation => write!(f, "model_invocation"),
            FailureKind::Setup => write!(f, "setup"),
        }
    }
}

/// Outcome of one task's evaluation.
///
/// `error` is present iff `success` is false. Metadata accumulates partial
/// progress, so a failure at stage K still reports the stages before it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    /// Name of the evaluated task.
    pub task_name: String,
    /// Whether every validation stage passed.
    pub success: bool,
    /// Failure classification, present iff the evaluation failed.
    pub failure: Option<FailureKind>,
    /// Error message, present iff the evaluation failed.
    pub error: Option<String>,
    /// Output directory the evaluation ran in.
    pub output_path: PathBuf,
    /// Per-stage diagnostics (captured stdout/stderr keyed by view).
    pub metadata: Map<String, Value>,
}

impl TaskResult {
    /// Creates a passing result.
    pub fn passed(
        task_name: impl Into<String>,
        output_path: impl Into<PathBuf>,
        metadata: Map<String, Value>,
    ) -> Self {
        Self {
            task_name: task_name.into(),
            success: true,
            failure: None,
            error: None,
            output_path: output_path.into(),
            metadata,
        }
    }

    /// Creates a failing result.
    pub fn failed(
        task_name: impl Into<String>,
        kind: FailureKind,
        error: impl Into<String>,
        output_path: impl Into<PathBuf>,
        metadata: Map<String, Value>,
    ) -> Self {
        Self {
            task_name: task_name.into(),
            success: false,
            failure: Some(kind),
            error: Some(error.into()),
            output_path: output_path.into(),
            metadata,
        }
    }

    /// Human-readable one-line status.
    pub fn status_line(&self) -> String {
        if self.success {
            format!("PASS {}", self.task_name)
        } else {
            format!(
                "FAIL {}: {}",
                self.task_name,
                self.error.as_deref().unwrap_or("unknown error")
            )
        }
    }
}

/// One (model, task-label) outcome inside a mesh run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshResult {
    /// Model identifier.
    pub model: String,
    /// Task label: the filtered task name, or "all tasks".
    pub task: String,
    /// Whether every task in the run passed.
    pub success: bool,
    /// Error message, present iff the run failed.
    pub error: Option<String>,
}

impl MeshResult {
    /// Creates a passing mesh result.
    pub fn passed(model: impl Into<String>, task: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            task: task.into(),
            success: true,
            error: None,
        }
    }

    /// Creates a failing mesh result.
    pub fn failed(
        model: impl Into<String>,
        task: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            task: task.into(),
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Aggregate outcome of a mesh run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Summary {
    /// Total evaluations recorded.
    pub total: usize,
    /// Evaluations that passed.
    pub successful: usize,
    /// Evaluations that failed.
    pub failed: usize,
    /// The failing entries, in recorded order.
    pub failures: Vec<MeshResult>,
}

impl Summary {
    /// Records one mesh result into the aggregate.
    pub fn record(&mut self, result: MeshResult) {
        self.total += 1;
        if result.success {
            self.successful += 1;
        } else {
            self.failed += 1;
            self.failures.push(result);
        }
    }

    /// Success percentage across all recorded evaluations.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.successful as f64 / self.total as f64 * 100.0
        }
    }

    /// Returns true if every recorded evaluation passed.
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_result_error_iff_failed() {
        let pass = TaskResult::passed("t", "/out/t", Map::new());
        assert!(pass.success);
        assert!(pass.error.is_none() && pass.failure.is_none());

        let fail = TaskResult::failed(
            "t",
            FailureKind::RenderFailed,
            "render failed",
            "/out/t",
            Map::new(),
        );
        assert!(!fail.success);
        assert!(fail.error.is_some());
        assert_eq!(fail.failure, Some(FailureKind::RenderFailed));
    }

    #[test]
    fn test_status_lines() {
        let pass = TaskResult::passed("bracket", "/out", Map::new());
        assert_eq!(pass.status_line(), "PASS bracket");

        let fail = TaskResult::failed(
            "bracket",
            FailureKind::MissingArtifact,
            "no artifact",
            "/out",
            Map::new(),
        );
        assert_eq!(fail.status_line(), "FAIL bracket: no artifact");
    }

    #[test]
    fn test_summary_counts_and_rate() {
        let mut summary = Summary::default();
        summary.record(MeshResult::passed("m1", "all tasks"));
        summary.record(MeshResult::failed("m2", "all tasks", "boom"));
        summary.record(MeshResult::passed("m3", "all tasks"));

        assert_eq!(summary.total, 3);
        assert_eq!(summary.successful, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].model, "m2");
        assert!(!summary.all_passed());
        assert!((summary.success_rate() - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_empty_summary() {
        let summary = Summary::default();
        assert!(summary.all_passed());
        assert_eq!(summary.success_rate(), 0.0);
    }
}
