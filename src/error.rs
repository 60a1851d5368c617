//! Error types for the abstrak library.
//!
//! All fallible operations return [`AbstrakError`] through the [`Result`]
//! alias. Degenerate input (empty or very short text) is never an error: the
//! normalizer yields an empty string and the keyword labeler yields its
//! low-confidence defaults.
//!
//! # Examples
//!
//! ```
//! use abstrak::error::{AbstrakError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(AbstrakError::invalid_argument("k must be positive"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The main error type for abstrak operations.
#[derive(Error, Debug)]
pub enum AbstrakError {
    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The feature extractor was used before `fit`.
    #[error("Feature extractor is not fitted; call fit() first")]
    NotFitted,

    /// The classifier was used for prediction or evaluation before `train`.
    #[error("Classifier is not trained; call train() first")]
    NotTrained,

    /// Too few labeled samples were offered for training.
    #[error("Insufficient training data: {required} labeled samples required, {actual} available")]
    InsufficientData { required: usize, actual: usize },

    /// A required model artifact is absent.
    #[error("Model artifact not found: {}", .0.display())]
    ArtifactMissing(PathBuf),

    /// A model artifact exists but cannot be decoded or is inconsistent.
    #[error("Model artifact corrupt: {0}")]
    ArtifactCorrupt(String),

    /// Document-frequency pruning left no terms in the vocabulary.
    #[error("After pruning, no terms remain; try a lower min_df or a higher max_df")]
    EmptyVocabulary,

    /// Another training run currently holds the model writer lock.
    #[error("A training run is already in progress")]
    TrainingInProgress,

    /// Invalid argument passed to an operation.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Analysis-related errors (tokenization, filtering, etc.)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Text extraction from an uploaded file failed.
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Record store errors.
    #[error("Store error: {0}")]
    Store(String),

    /// Binary serialization errors.
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with AbstrakError.
pub type Result<T> = std::result::Result<T, AbstrakError>;

impl AbstrakError {
    /// Create a new insufficient data error.
    pub fn insufficient_data(required: usize, actual: usize) -> Self {
        AbstrakError::InsufficientData { required, actual }
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        AbstrakError::InvalidArgument(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        AbstrakError::InvalidConfig(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        AbstrakError::Analysis(msg.into())
    }

    /// Create a new corrupt artifact error.
    pub fn corrupt<S: Into<String>>(msg: S) -> Self {
        AbstrakError::ArtifactCorrupt(msg.into())
    }

    /// Create a new extraction error.
    pub fn extraction<S: Into<String>>(msg: S) -> Self {
        AbstrakError::Extraction(msg.into())
    }

    /// Create a new store error.
    pub fn store<S: Into<String>>(msg: S) -> Self {
        AbstrakError::Store(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        AbstrakError::Other(msg.into())
    }

    /// Whether the error means "no usable model on disk", so the caller
    /// should retrain rather than retry.
    pub fn is_missing_model(&self) -> bool {
        matches!(
            self,
            AbstrakError::ArtifactMissing(_) | AbstrakError::ArtifactCorrupt(_)
        )
    }
}
