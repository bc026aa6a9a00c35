//! Error types for the ContextWeave domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.
//!
//! Errors here are contract violations (malformed input, missing scope).
//! Best-effort sources such as file search never surface through this
//! type; they are logged and replaced with empty results where they occur.

use thiserror::Error;

/// The top-level error type for all ContextWeave operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Normalization errors ---
    #[error("Normalization error: {0}")]
    Normalize(#[from] NormalizeError),

    // --- Retrieval errors ---
    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    // --- Storage errors ---
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    #[error("Invalid message shape: {0}")]
    InvalidMessageShape(String),

    #[error("Non-text content: {0}")]
    NonTextContent(String),

    #[error("Invalid tool call: {0}")]
    InvalidToolCall(String),

    #[error("Invalid tool shape: {0}")]
    InvalidToolShape(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RetrievalError {
    #[error("Context retrieval requires a non-empty isolation scope")]
    MissingIsolationScope,
}

#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Storage call timed out: {0}")]
    Timeout(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_error_displays_correctly() {
        let err = Error::Normalize(NormalizeError::InvalidMessageShape(
            "message must have a 'content' property".into(),
        ));
        assert!(err.to_string().contains("Invalid message shape"));
        assert!(err.to_string().contains("'content'"));
    }

    #[test]
    fn missing_scope_converts_into_top_level() {
        let err: Error = RetrievalError::MissingIsolationScope.into();
        assert!(matches!(err, Error::Retrieval(RetrievalError::MissingIsolationScope)));
        assert!(err.to_string().contains("isolation scope"));
    }

    #[test]
    fn storage_error_displays_correctly() {
        let err = Error::Storage(StorageError::QueryFailed("fts index missing".into()));
        assert!(err.to_string().contains("fts index missing"));
    }
}
