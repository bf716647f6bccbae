//! Error types for the expense categorization engine.
//!
//! All fallible operations in this crate return [`Result`], whose error type
//! is the [`CategorizerError`] enum. The variants mirror the three failure
//! classes the engine distinguishes: validation of training input, analysis
//! of text features, and persistence of model state.

use std::io;

use thiserror::Error;

/// The main error type for categorizer operations.
#[derive(Error, Debug)]
pub enum CategorizerError {
    /// Training input failed validation (no state was mutated).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Text analysis or feature extraction failed.
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Reading or writing persisted model state failed.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with [`CategorizerError`].
pub type Result<T> = std::result::Result<T, CategorizerError>;

impl CategorizerError {
    /// Create a new validation error.
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        CategorizerError::Validation(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        CategorizerError::Analysis(msg.into())
    }

    /// Create a new persistence error.
    pub fn persistence<S: Into<String>>(msg: S) -> Self {
        CategorizerError::Persistence(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        CategorizerError::Other(msg.into())
    }

    /// Whether this error came from the validation of training input.
    pub fn is_validation(&self) -> bool {
        matches!(self, CategorizerError::Validation(_))
    }
}
