//! In-memory document store.
//!
//! Holds the ledger text behind an `Arc<RwLock>`. Useful for tests and
//! for embedding the updater without a filesystem.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::ports::{DocumentStore, StoreError};

/// Document store keeping the ledger text in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    content: Arc<RwLock<String>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with initial ledger text.
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            content: Arc::new(RwLock::new(content.into())),
        }
    }

    /// Returns a snapshot of the current content.
    pub async fn snapshot(&self) -> String {
        self.content.read().await.clone()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn load(&self) -> Result<String, StoreError> {
        Ok(self.content.read().await.clone())
    }

    async fn save(&self, content: &str) -> Result<(), StoreError> {
        *self.content.write().await = content.to_string();
        Ok(())
    }
}
