//! Error types for the workspace engine

use thiserror::Error;

/// Main error type for the workshop engine.
///
/// Failures scoped to a single action are folded into its terminal state by
/// the executor; only invariant violations (a missing artifact, a refused
/// storage handle) surface as `Err` to callers.
#[derive(Error, Debug)]
pub enum WorkshopError {
    /// Storage consent was refused; the repository stays uninitialized.
    #[error("access to workspace storage was denied")]
    AccessDenied,

    #[error("workspace storage is not initialized")]
    NotInitialized,

    /// The registry has no artifact for the addressed message id. This
    /// signals desynchronization with the upstream parser, not a
    /// recoverable user error.
    #[error("artifact not found: {0}")]
    ArtifactNotFound(String),

    /// Storage-level failure that is not backed by a real I/O error.
    #[error("storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Watch error: {0}")]
    Watch(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, WorkshopError>;
