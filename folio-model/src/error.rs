use std::fmt::{self, Display};

/// Errors produced by model constructors and validation routines.
#[derive(Debug)]
pub enum ModelError {
    Json(serde_json::Error),
    InvalidStructure(String),
    MissingField(&'static str),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::Json(err) => {
                write!(f, "invalid image structure data: {err}")
            }
            ModelError::InvalidStructure(msg) => {
                write!(f, "invalid image structure data: {msg}")
            }
            ModelError::MissingField(field) => {
                write!(f, "{field} is required")
            }
        }
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ModelError::Json(err) => Some(err),
            ModelError::InvalidStructure(_) | ModelError::MissingField(_) => {
                None
            }
        }
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::Json(err)
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;
