use thiserror::Error;

/// Common error type shared by the editor crates
#[derive(Error, Debug)]
pub enum CommonError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Field not found: {0}")]
    FieldNotFound(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),
}
