//! In-memory storage capability using DashMap (replaces a real file store
//! for tests and embedding)

use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use workshop_core::{EntryKind, Result, StorageCapability, StorageEntry, WorkshopError};

/// Hierarchical in-memory store.
///
/// Directories exist implicitly above any inserted file path and
/// explicitly through [`StorageCapability::create_directory`]. Consent and
/// write faults can be switched on to exercise error paths.
pub struct MemoryStorage {
    files: DashMap<String, String>,
    directories: DashMap<String, ()>,
    deny_access: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            files: DashMap::new(),
            directories: DashMap::new(),
            deny_access: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Seed with `(path, content)` pairs; parent directories appear
    /// implicitly.
    pub fn with_files<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        let storage = Self::new();
        for (path, content) in entries {
            storage.files.insert(path.into(), content.into());
        }
        storage
    }

    /// Register a directory that may stay empty.
    pub fn add_directory(&self, path: &str) {
        self.directories.insert(path.to_string(), ());
    }

    /// Make `initialize` fail with `AccessDenied` until allowed again.
    pub fn deny_access(&self, deny: bool) {
        self.deny_access.store(deny, Ordering::SeqCst);
    }

    /// Make writes and directory creation fail with a storage error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Direct content lookup for assertions.
    pub fn content(&self, path: &str) -> Option<String> {
        self.files.get(path).map(|entry| entry.value().clone())
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn child_suffix<'a>(parent: &str, path: &'a str) -> Option<&'a str> {
    if parent.is_empty() {
        Some(path)
    } else {
        path.strip_prefix(parent)?.strip_prefix('/')
    }
}

#[async_trait]
impl StorageCapability for MemoryStorage {
    async fn initialize(&self) -> Result<()> {
        if self.deny_access.load(Ordering::SeqCst) {
            return Err(WorkshopError::AccessDenied);
        }
        Ok(())
    }

    async fn list_children(&self, path: &str) -> Result<Vec<StorageEntry>> {
        let mut directories = BTreeSet::new();
        let mut file_names = BTreeSet::new();

        for entry in self.files.iter() {
            if let Some(rest) = child_suffix(path, entry.key()) {
                match rest.split_once('/') {
                    Some((head, _)) => {
                        directories.insert(head.to_string());
                    }
                    None => {
                        file_names.insert(rest.to_string());
                    }
                }
            }
        }
        for entry in self.directories.iter() {
            if let Some(rest) = child_suffix(path, entry.key()) {
                if let Some(head) = rest.split('/').next() {
                    if !head.is_empty() {
                        directories.insert(head.to_string());
                    }
                }
            }
        }

        let mut entries: Vec<StorageEntry> = directories
            .into_iter()
            .map(|name| StorageEntry {
                name,
                kind: EntryKind::Directory,
            })
            .collect();
        entries.extend(file_names.into_iter().map(|name| StorageEntry {
            name,
            kind: EntryKind::File,
        }));
        Ok(entries)
    }

    async fn read_file(&self, path: &str) -> Result<String> {
        self.files
            .get(path)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| WorkshopError::Storage(format!("no such file: {}", path)))
    }

    async fn write_file(&self, path: &str, content: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(WorkshopError::Storage(format!("write failed: {}", path)));
        }
        self.files.insert(path.to_string(), content.to_string());
        Ok(())
    }

    async fn create_directory(&self, path: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(WorkshopError::Storage(format!(
                "directory creation failed: {}",
                path
            )));
        }
        self.directories.insert(path.to_string(), ());
        Ok(())
    }
}
