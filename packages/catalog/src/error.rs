//! Error types for the catalog

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("Unknown component kind: {0}")]
    UnknownKind(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),
}
