//! Storage capability over a hierarchical file store

use crate::error::Result;
use async_trait::async_trait;

/// Kind of a storage entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// One child entry returned by [`StorageCapability::list_children`].
#[derive(Debug, Clone)]
pub struct StorageEntry {
    pub name: String,
    pub kind: EntryKind,
}

/// Pluggable hierarchical storage handle.
///
/// Paths are normalized, slash separated and relative to the storage root;
/// the empty string addresses the root itself. Every operation may fail
/// with an access or I/O error from the backing store.
#[async_trait]
pub trait StorageCapability: Send + Sync {
    /// Acquire the root handle. May require user consent and fails with
    /// [`crate::WorkshopError::AccessDenied`] when it is refused.
    async fn initialize(&self) -> Result<()>;

    /// Enumerate the direct children of a directory.
    async fn list_children(&self, path: &str) -> Result<Vec<StorageEntry>>;

    /// Read a file fully as text.
    async fn read_file(&self, path: &str) -> Result<String>;

    /// Write the full content of a file, creating it when missing. A write
    /// either fully completes or fully fails.
    async fn write_file(&self, path: &str, content: &str) -> Result<()>;

    /// Create a directory. Succeeds when it already exists.
    async fn create_directory(&self, path: &str) -> Result<()>;
}
