use crate::model::validation::ValidationErrors;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid match: {0}")]
    Validation(ValidationErrors),

    #[error("Match not found: {0}")]
    MatchNotFound(String),

    #[error("Ambiguous match id prefix: {0}")]
    AmbiguousId(String),

    #[error("Import failed: {0}")]
    Import(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Stored {key} document is damaged: {message}")]
    CorruptStore { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(String),
}

impl AppError {
    /// Re-labels a parse failure of a document read back from storage, so it
    /// is not confused with a rejected import file.
    pub fn stored(self, key: &str) -> Self {
        match self {
            AppError::Import(message) => AppError::CorruptStore {
                key: key.to_string(),
                message,
            },
            other => other,
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(errors)
    }
}
