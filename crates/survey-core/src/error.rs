//! Centralized error types for Survey Right.

use survey_db::DbError;
use thiserror::Error;

/// Main error type for survey and response operations.
#[derive(Error, Debug)]
pub enum SurveyError {
    #[error("Survey not found: {0}")]
    SurveyNotFound(String),

    #[error("Survey refid already exists: {0}")]
    DuplicateRefId(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for survey operations.
pub type SurveyResult<T> = Result<T, SurveyError>;

impl SurveyError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }
}
