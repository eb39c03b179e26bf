//! Error types for Gepetto
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in Gepetto
#[derive(Debug, Error)]
pub enum GepettoError {
    /// A step references a variable the configuration does not define
    #[error("Required variable '{0}' is not defined")]
    MissingVariable(String),

    /// Task script could not be parsed
    #[error("Invalid task {path}: {reason}")]
    InvalidTask { path: String, reason: String },

    /// Configuration load/save error
    #[error("Config error: {0}")]
    Config(String),

    /// Reasoning backend or LLM failure
    #[error("Backend error: {0}")]
    Backend(String),

    /// Report persistence error
    #[error("Report error: {0}")]
    Report(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl GepettoError {
    /// True for errors caused by the script/config author rather than a defect
    pub fn is_authoring_error(&self) -> bool {
        matches!(self, GepettoError::MissingVariable(_) | GepettoError::InvalidTask { .. })
    }
}

/// Result type alias for Gepetto operations
pub type Result<T> = std::result::Result<T, GepettoError>;
