//! Error types for the presentation layer.

use thiserror::Error;

/// Errors raised while building view models.
#[derive(Debug, Error)]
pub enum ViewError {
    /// A record could not be converted to JSON for column extraction.
    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A column sorts by a scope the query does not declare.
    #[error("column '{column}' sorts by undeclared scope '{scope}'")]
    UnknownSortScope { column: String, scope: String },
}

pub type Result<T> = std::result::Result<T, ViewError>;
