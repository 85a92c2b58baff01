//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Schema error: {0}")]
    Schema(#[from] formset_schema::SchemaError),

    #[error("Tabs error: {0}")]
    Tabs(#[from] formset_tabs::TabsError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid form definition: {0}")]
    InvalidForm(String),
}
