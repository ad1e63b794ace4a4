//! Run configuration: the models list and mesh settings.
//!
//! Configuration is loaded once at the entry point and passed down through
//! constructors; no component below the CLI reads the environment.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// The external models document: `{ "models": [...], "metadata": {...} }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsFile {
    /// Model identifiers to evaluate, in run order.
    pub models: Vec<String>,
    /// Optional bookkeeping metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ModelsMetadata>,
}

/// Optional metadata block of the models document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelsMetadata {
    /// Free-form description of the list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// When the list was last touched.
    #[serde(default, rename = "lastUpdated", skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl ModelsFile {
    /// Loads and validates the models document from a JSON file.
    ///
    /// Errors carry the fully-qualified path so a misconfigured working
    /// directory is obvious from the message alone.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let qualified = qualify(path);

        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::ModelsFileNotFound {
                    path: qualified.clone(),
                }
            } else {
                ConfigError::Io(e)
            }
        })?;

        let parsed: ModelsFile =
            serde_json::from_str(&content).map_err(|e| ConfigError::ModelsFileParse {
                path: qualified.clone(),
                message: e.to_string(),
            })?;

        if parsed.models.is_empty() {
            return Err(ConfigError::EmptyModelList { path: qualified });
        }

        Ok(parsed)
    }
}

/// Returns an absolute form of the path for error reporting.
fn qualify(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Settings for one mesh invocation.
#[derive(Debug, Clone)]
pub struct MeshConfig {
    /// Models to evaluate, in order.
    pub models: Vec<String>,
    /// Optional single task to run instead of the full registry.
    pub task_filter: Option<String>,
    /// Root directory run directories are created under.
    pub results_root: PathBuf,
}

impl MeshConfig {
    /// Creates a mesh configuration.
    pub fn new(models: Vec<String>, task_filter: Option<String>, results_root: PathBuf) -> Self {
        Self {
            models,
            task_filter,
            results_root,
        }
    }
}
