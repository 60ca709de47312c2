//! Error types for the editor

use cmsedit_catalog::CatalogError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Session is not authorized to edit content")]
    NotAuthorized,

    #[error("Edit mode is not active")]
    EditModeInactive,

    #[error("A save is already in flight")]
    SaveInProgress,

    #[error("Block index {index} out of bounds for list of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Field '{0}' is not part of the form")]
    UnknownField(String),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
