//! Tabs error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TabsError {
    #[error("Component factory error: {0}")]
    Factory(String),

    #[error("Schema error: {0}")]
    Schema(#[from] formset_schema::SchemaError),

    #[error("Mount error: {0}")]
    Mount(String),
}
