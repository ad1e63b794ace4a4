//! Mesh orchestrator: every configured model against every (or one) task.
//!
//! The loop is strictly sequential and isolated per model: one model's
//! failure is recorded and the next model still runs. Only configuration
//! errors (unknown task filter) abort before any model call.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::error::ConfigError;
use crate::llm::ModelClient;
use crate::render::Renderer;
use crate::tasks::TaskRegistry;

use super::config::MeshConfig;
use super::executor::Executor;
use super::ledger;
use super::result::{MeshResult, Summary};

/// Task label used when no filter is set.
const ALL_TASKS_LABEL: &str = "all tasks";

/// Runs the model×task evaluation mesh.
pub struct MeshRunner {
    registry: TaskRegistry,
    executor: Executor,
    config: MeshConfig,
}

impl MeshRunner {
    /// Creates a mesh runner.
    pub fn new(
        registry: TaskRegistry,
        client: Arc<dyn ModelClient>,
        renderer: Arc<dyn Renderer>,
        config: MeshConfig,
    ) -> Self {
        Self {
            registry,
            executor: Executor::new(client, renderer),
            config,
        }
    }

    /// Resolves the task set: the single filtered task, or the full registry
    /// enumeration. An unknown filter is a configuration error, raised before
    /// any model call.
    fn resolve_tasks(&self) -> Result<Vec<String>, ConfigError> {
        match &self.config.task_filter {
            Some(name) => {
                if self.registry.has(name) {
                    Ok(vec![name.clone()])
                } else {
                    Err(ConfigError::UnknownTask(name.clone()))
                }
            }
            None => Ok(self.registry.names()),
        }
    }

    /// Runs every configured model against the resolved task set and returns
    /// the aggregate summary.
    pub async fn run(&self) -> Result<Summary, ConfigError> {
        let tasks = self.resolve_tasks()?;
        let label = self
            .config
            .task_filter
            .clone()
            .unwrap_or_else(|| ALL_TASKS_LABEL.to_string());

        info!(
            models = self.config.models.len(),
            tasks = tasks.len(),
            "Starting mesh evaluation"
        );

        let mut summary = Summary::default();
        for model in &self.config.models {
            let result = self.evaluate_model(model, &tasks, &label).await;
            summary.record(result);
        }

        Ok(summary)
    }

    /// Runs one model over the task set, aggregating its per-task outcomes
    /// into a single mesh result.
    async fn evaluate_model(&self, model: &str, tasks: &[String], label: &str) -> MeshResult {
        let run_dir = self
            .config
            .results_root
            .join(ledger::run_dir_name(model, Utc::now()));

        info!(model, run_dir = %run_dir.display(), "Evaluating model");

        let mut failures = Vec::new();
        for name in tasks {
            // resolve_tasks already checked membership; a registry mutation
            // between then and now is impossible, so a miss here is a bug.
            let Some(task) = self.registry.get(name) else {
                failures.push(format!("{}: task disappeared from registry", name));
                continue;
            };

            let result = self
                .executor
                .run(model, task, &run_dir.join(name))
                .await;

            println!("[{}] {}", model, result.status_line());

            if !result.success {
                failures.push(format!(
                    "{}: {}",
                    name,
                    result.error.as_deref().unwrap_or("unknown error")
                ));
            }
        }

        if failures.is_empty() {
            MeshResult::passed(model, label)
        } else {
            MeshResult::failed(model, label, failures.join("; "))
        }
    }
}
