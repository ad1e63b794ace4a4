//! Sandboxed artifact store for model-driven file access.
//!
//! Binds read/write capabilities to one output directory per task run. This
//! is the only component permitted to touch disk on the model's behalf; every
//! path a model supplies is resolved relative to the bound root and rejected
//! if it escapes it.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// Error types for sandboxed file operations.
///
/// These are returned to the tool caller (the model) as data, never thrown
/// across the executor boundary.
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("Path escapes the task sandbox: {path}")]
    PathEscape { path: String },

    #[error("File not found: {path}")]
    NotFound { path: String },

    #[error("IO error on {path}: {message}")]
    Io { path: String, message: String },
}

/// File store scoped to a single working directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Creates a store bound to the given root. The root itself is created
    /// lazily on the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the bound root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a caller-supplied relative path against the root.
    ///
    /// Absolute paths are rejected outright. Relative paths are walked
    /// component by component so that `..` sequences can never climb above
    /// the root, even when interleaved with normal segments.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, SandboxError> {
        let candidate = Path::new(relative);
        if candidate.is_absolute() {
            return Err(SandboxError::PathEscape {
                path: relative.to_string(),
            });
        }

        let mut depth: i32 = 0;
        for component in candidate.components() {
            match component {
                Component::Normal(_) => depth += 1,
                Component::CurDir => {}
                Component::ParentDir => {
                    depth -= 1;
                    if depth < 0 {
                        return Err(SandboxError::PathEscape {
                            path: relative.to_string(),
                        });
                    }
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(SandboxError::PathEscape {
                        path: relative.to_string(),
                    });
                }
            }
        }

        Ok(self.root.join(candidate))
    }

    /// Reads the full contents of a file under the root as text.
    pub fn read(&self, relative: &str) -> Result<String, SandboxError> {
        let path = self.resolve(relative)?;
        std::fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SandboxError::NotFound {
                    path: relative.to_string(),
                }
            } else {
                SandboxError::Io {
                    path: relative.to_string(),
                    message: e.to_string(),
                }
            }
        })
    }

    /// Writes full content to a file under the root, creating parent
    /// directories as needed. Overwrites any existing file. Returns the
    /// number of bytes written.
    pub fn write(&self, relative: &str, content: &str) -> Result<usize, SandboxError> {
        let path = self.resolve(relative)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SandboxError::Io {
                path: relative.to_string(),
                message: e.to_string(),
            })?;
        }
        std::fs::write(&path, content).map_err(|e| SandboxError::Io {
            path: relative.to_string(),
            message: e.to_string(),
        })?;
        Ok(content.len())
    }
}
