//! Error types for cad-forge operations.
//!
//! Defines error types for the cross-cutting subsystems:
//! - Configuration loading (credentials, models file, task selection)
//! - LLM API interactions
//!
//! Subsystem-local errors (sandbox, renderer) live next to their owners.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort an evaluation before any model call.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing API key: pass --api-key or set OPENROUTER_API_KEY")]
    MissingApiKey,

    #[error("Models configuration file not found: {}", path.display())]
    ModelsFileNotFound { path: PathBuf },

    #[error("Failed to parse models file {}: {message}", path.display())]
    ModelsFileParse { path: PathBuf, message: String },

    #[error("Models file {} declares no models", path.display())]
    EmptyModelList { path: PathBuf },

    #[error("Unknown task '{0}'")]
    UnknownTask(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse LLM response: {0}")]
    ParseError(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("API error ({code}): {message}")]
    ApiError { code: u16, message: String },

    #[error("Model returned no final answer")]
    EmptyResponse,

    #[error("Tool round limit exceeded: {limit} rounds")]
    RoundLimitExceeded { limit: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
