use folio_model::ModelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FolioError {
    /// Malformed or incomplete client input. Raised before any side effect.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// A payload never reached the content store (including timeouts).
    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Mail delivery failed: {0}")]
    Mail(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl FolioError {
    pub fn validation(message: impl Into<String>) -> Self {
        FolioError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        FolioError::NotFound(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, FolioError::Validation(_))
    }
}

impl From<ModelError> for FolioError {
    fn from(err: ModelError) -> Self {
        FolioError::Validation(err.to_string())
    }
}

impl From<sqlx::Error> for FolioError {
    fn from(err: sqlx::Error) -> Self {
        FolioError::Database(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FolioError>;
