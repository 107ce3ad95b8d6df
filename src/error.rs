//! Error types for the refgraph dependency analyzer.
//!
//! Only failures that abort an analysis live here. A dependency that cannot be
//! loaded is not an error at this level: it becomes a `NotFound` node in the
//! graph instead.

use std::path::PathBuf;
use thiserror::Error;

use crate::provider::LookupError;

/// Main error type for refgraph operations.
#[derive(Debug, Error)]
pub enum RefGraphError {
    /// The target module could not be loaded; no report can be produced.
    #[error("Cannot load target module {}: {source}", path.display())]
    TargetLoad {
        path: PathBuf,
        #[source]
        source: LookupError,
    },

    /// Invalid input supplied by the caller
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors (report output, config files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for refgraph operations
pub type Result<T> = std::result::Result<T, RefGraphError>;
