//! Document store port - the two-operation storage capability.
//!
//! The core reads the whole ledger as text and writes the whole rendered
//! ledger back. Any backend (vault file, object store, in-memory stub)
//! implements this trait; the core never interprets or retries storage
//! failures.

use async_trait::async_trait;
use thiserror::Error;

/// Capability interface for loading and saving the ledger document.
///
/// `load` returning an empty string means "no document yet"; the updater
/// bootstraps an empty ledger from it. Both operations suspend on IO and
/// may fail with a [`StoreError`] that propagates unmodified.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Loads the raw ledger text.
    async fn load(&self) -> Result<String, StoreError>;

    /// Persists the rendered ledger text, replacing previous content.
    async fn save(&self, content: &str) -> Result<(), StoreError>;
}

/// Errors surfaced by document store implementations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The backing location exists but cannot be accessed.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    /// Any other IO failure.
    #[error("IO error: {message}")]
    Io { message: String },
}

impl StoreError {
    /// Creates a permission denied error.
    pub fn permission_denied(path: impl Into<String>) -> Self {
        Self::PermissionDenied { path: path.into() }
    }

    /// Creates an IO error.
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => StoreError::permission_denied(err.to_string()),
            _ => StoreError::io(err.to_string()),
        }
    }
}
