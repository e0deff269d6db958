//! Local-disk storage capability over tokio::fs

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;
use workshop_core::{EntryKind, Result, StorageCapability, StorageEntry, WorkshopError};

/// Storage capability rooted at a directory on the local disk.
///
/// All paths are slash separated and relative to the root; components that
/// would escape the root (`..`) are rejected. Directory listings are
/// sorted by name so snapshot loads are deterministic.
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let mut resolved = self.root.clone();
        for segment in path.split('/') {
            match segment {
                "" | "." => continue,
                ".." => {
                    return Err(WorkshopError::Storage(format!(
                        "path escapes workspace root: {}",
                        path
                    )))
                }
                segment => resolved.push(segment),
            }
        }
        Ok(resolved)
    }
}

#[async_trait]
impl StorageCapability for LocalStorage {
    async fn initialize(&self) -> Result<()> {
        let metadata = fs::metadata(&self.root)
            .await
            .map_err(|_| WorkshopError::AccessDenied)?;
        if !metadata.is_dir() {
            return Err(WorkshopError::AccessDenied);
        }
        debug!("Opened workspace root: {}", self.root.display());
        Ok(())
    }

    async fn list_children(&self, path: &str) -> Result<Vec<StorageEntry>> {
        let dir = self.resolve(path)?;
        let mut entries = Vec::new();
        let mut read_dir = fs::read_dir(&dir).await?;
        while let Some(entry) = read_dir.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            let file_type = entry.file_type().await?;
            let kind = if file_type.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            entries.push(StorageEntry { name, kind });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn read_file(&self, path: &str) -> Result<String> {
        let resolved = self.resolve(path)?;
        Ok(fs::read_to_string(resolved).await?)
    }

    async fn write_file(&self, path: &str, content: &str) -> Result<()> {
        let resolved = self.resolve(path)?;
        fs::write(resolved, content).await?;
        Ok(())
    }

    async fn create_directory(&self, path: &str) -> Result<()> {
        let resolved = self.resolve(path)?;
        fs::create_dir_all(resolved).await?;
        Ok(())
    }
}
