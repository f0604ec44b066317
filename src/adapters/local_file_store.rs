//! Local filesystem store - persists the ledger as one Markdown file.
//!
//! Writes use a temp-file + rename pattern so a crash mid-write never
//! leaves a truncated ledger behind.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::ports::{DocumentStore, StoreError};

/// Document store backed by a single file in a vault directory.
///
/// A missing file loads as an empty string: the first consolidation run
/// bootstraps the ledger.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    path: PathBuf,
}

impl LocalFileStore {
    /// Creates a store for the given ledger file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the ledger file path.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "ledger.md".to_string());
        name.push_str(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl DocumentStore for LocalFileStore {
    async fn load(&self) -> Result<String, StoreError> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => Ok(content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "ledger file absent, starting empty");
                Ok(String::new())
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn save(&self, content: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let temp = self.temp_path();
        let mut file = fs::File::create(&temp).await?;
        file.write_all(content.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp, &self.path).await?;
        debug!(
            path = %self.path.display(),
            bytes = content.len(),
            "ledger file written"
        );
        Ok(())
    }
}
