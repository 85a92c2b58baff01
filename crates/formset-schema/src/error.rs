//! Schema error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected a tabs component, found: {0}")]
    NotTabs(String),

    #[error("Invalid property path: {0}")]
    InvalidPath(String),
}
