//! In-test fakes for the capability ports

use crate::error::{Result, WorkshopError};
use crate::ports::{CommandRunner, EntryKind, StorageCapability, StorageEntry};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;
use workshop_types::CommandOutput;

/// In-memory storage fake with fault switches for consent and writes.
#[derive(Default)]
pub(crate) struct TestStorage {
    files: Mutex<BTreeMap<String, String>>,
    directories: Mutex<BTreeSet<String>>,
    deny_access: AtomicBool,
    fail_writes: AtomicBool,
}

impl TestStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_files<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        let storage = Self::new();
        {
            let mut files = storage.files.lock().unwrap();
            for (path, content) in entries {
                files.insert(path.into(), content.into());
            }
        }
        storage
    }

    pub fn add_directory(&self, path: &str) {
        self.directories.lock().unwrap().insert(path.to_string());
    }

    pub fn deny_access(&self, deny: bool) {
        self.deny_access.store(deny, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
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
impl StorageCapability for TestStorage {
    async fn initialize(&self) -> Result<()> {
        if self.deny_access.load(Ordering::SeqCst) {
            return Err(WorkshopError::AccessDenied);
        }
        Ok(())
    }

    async fn list_children(&self, path: &str) -> Result<Vec<StorageEntry>> {
        let mut directories = BTreeSet::new();
        let mut file_names = BTreeSet::new();

        for file_path in self.files.lock().unwrap().keys() {
            if let Some(rest) = child_suffix(path, file_path) {
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
        for dir_path in self.directories.lock().unwrap().iter() {
            if let Some(rest) = child_suffix(path, dir_path) {
                let head = rest.split('/').next().unwrap_or(rest);
                if !head.is_empty() {
                    directories.insert(head.to_string());
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
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| WorkshopError::Storage(format!("no such file: {}", path)))
    }

    async fn write_file(&self, path: &str, content: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(WorkshopError::Storage(format!("write failed: {}", path)));
        }
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), content.to_string());
        Ok(())
    }

    async fn create_directory(&self, path: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(WorkshopError::Storage(format!(
                "directory creation failed: {}",
                path
            )));
        }
        self.directories.lock().unwrap().insert(path.to_string());
        Ok(())
    }
}

/// Command runner that blocks until its token is cancelled, then fails.
pub(crate) struct HangingRunner;

#[async_trait]
impl CommandRunner for HangingRunner {
    async fn run(&self, _command: &str, cancel: CancellationToken) -> Result<CommandOutput> {
        cancel.cancelled().await;
        Err(WorkshopError::Other("command cancelled".to_string()))
    }
}

/// Command runner that succeeds after a short delay unless cancelled first.
pub(crate) struct DelayedRunner {
    pub delay_ms: u64,
}

#[async_trait]
impl CommandRunner for DelayedRunner {
    async fn run(&self, command: &str, cancel: CancellationToken) -> Result<CommandOutput> {
        tokio::select! {
            _ = cancel.cancelled() => Err(WorkshopError::Other("command cancelled".to_string())),
            _ = tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)) => {
                Ok(CommandOutput {
                    output: format!("ran: {}", command),
                    exit_code: 0,
                })
            }
        }
    }
}
