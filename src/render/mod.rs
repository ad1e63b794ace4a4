//! External renderer integration.
//!
//! Geometry correctness is never judged in-process: a task's artifact is
//! handed to the external OpenSCAD renderer, once per declared camera view,
//! and the captured exit status plus stdout/stderr are returned as opaque
//! data to the validation pipeline.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// A named camera configuration the renderer is invoked with.
///
/// Each view produces one distinct output file. Translation and rotation
/// (degrees) are joined into a single comma-separated `--camera` argument;
/// a view without camera parameters uses the renderer's default framing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraView {
    /// View name, e.g. "default" or "bottom-isometric".
    pub name: String,
    /// Camera translation [x, y, z].
    pub translation: Option<[f64; 3]>,
    /// Camera rotation [x, y, z] in degrees.
    pub rotation: Option<[f64; 3]>,
}

impl CameraView {
    /// Creates a view with no camera override.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            translation: None,
            rotation: None,
        }
    }

    /// Sets the camera translation.
    pub fn with_translation(mut self, translation: [f64; 3]) -> Self {
        self.translation = Some(translation);
        self
    }

    /// Sets the camera rotation in degrees.
    pub fn with_rotation(mut self, rotation: [f64; 3]) -> Self {
        self.rotation = Some(rotation);
        self
    }

    /// Builds the comma-separated `--camera` argument, if any parameter is set.
    ///
    /// Unset halves default to zero so a rotation-only view still produces a
    /// complete six-component argument.
    pub fn camera_arg(&self) -> Option<String> {
        if self.translation.is_none() && self.rotation.is_none() {
            return None;
        }
        let t = self.translation.unwrap_or([0.0; 3]);
        let r = self.rotation.unwrap_or([0.0; 3]);
        Some(format!(
            "{},{},{},{},{},{}",
            t[0], t[1], t[2], r[0], r[1], r[2]
        ))
    }

    /// Output file name for this view, by convention: the default view renders
    /// `<task>.png`, any other view `<task>-<short>.png` where `<short>` is
    /// the first hyphen-separated segment of the view name.
    pub fn output_file_name(&self, task: &str) -> String {
        if self.name == "default" {
            format!("{}.png", task)
        } else {
            format!("{}-{}.png", task, self.short_name())
        }
    }

    /// Per-stage metadata key, e.g. "defaultView" or "bottomView".
    pub fn metadata_key(&self) -> String {
        format!("{}View", self.short_name())
    }

    fn short_name(&self) -> &str {
        self.name.split('-').next().unwrap_or(&self.name)
    }
}

/// Captured outcome of one renderer invocation.
///
/// stdout/stderr are opaque strings for diagnostics; they are never parsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderOutput {
    /// Process exit code (0 = success).
    pub exit_code: i32,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl RenderOutput {
    /// Returns true if the renderer signalled success.
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Errors from launching the external renderer.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to launch renderer '{binary}': {message}")]
    Spawn { binary: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Renders a source file to an output image for one camera view.
///
/// The trait seam exists so the validation pipeline can be exercised without
/// a renderer installed.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Invokes the renderer with (source, output, view) and captures the result.
    async fn render(
        &self,
        source: &Path,
        output: &Path,
        view: &CameraView,
    ) -> Result<RenderOutput, RenderError>;
}

/// Renderer backed by the `openscad` executable.
pub struct OpenScadRenderer {
    /// Path or name of the openscad binary.
    binary: String,
}

impl OpenScadRenderer {
    /// Creates a renderer invoking the given binary.
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Returns the configured binary.
    pub fn binary(&self) -> &str {
        &self.binary
    }
}

impl Default for OpenScadRenderer {
    fn default() -> Self {
        Self::new("openscad")
    }
}

#[async_trait]
impl Renderer for OpenScadRenderer {
    async fn render(
        &self,
        source: &Path,
        output: &Path,
        view: &CameraView,
    ) -> Result<RenderOutput, RenderError> {
        let mut command = tokio::process::Command::new(&self.binary);
        command
            .arg("-o")
            .arg(output)
            // Force a full re-render with the manifold backend, auto-centered
            // and framed to the whole scene.
            .arg("--render")
            .arg("--backend")
            .arg("manifold")
            .arg("--autocenter")
            .arg("--viewall");

        if let Some(camera) = view.camera_arg() {
            command.arg("--camera").arg(camera);
        }
        command.arg(source);

        debug!(
            view = %view.name,
            source = %source.display(),
            output = %output.display(),
            "Invoking renderer"
        );

        let result = command.output().await.map_err(|e| RenderError::Spawn {
            binary: self.binary.clone(),
            message: e.to_string(),
        })?;

        Ok(RenderOutput {
            exit_code: result.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&result.stdout).to_string(),
            stderr: String::from_utf8_lossy(&result.stderr).to_string(),
        })
    }
}
