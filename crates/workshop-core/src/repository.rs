//! Authoritative snapshot of the workspace tree

use crate::config::WorkspaceConfig;
use crate::error::{Result, WorkshopError};
use crate::ports::{EntryKind, StorageCapability};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, error, info};
use workshop_types::{FileMap, FileNode};

/// Notification emitted when committed content changes.
#[derive(Debug, Clone)]
pub enum FileEvent {
    /// The whole snapshot was replaced by a fresh load.
    SnapshotReplaced,
    /// A single file was committed through [`FileRepository::save_file`].
    FileSaved(String),
}

struct RepositoryState {
    initialized: bool,
    files: FileMap,
    modified: BTreeSet<String>,
}

/// Canonical, persisted path → content mapping over a storage capability.
///
/// The in-memory snapshot is the single source of truth for committed
/// content; editor drafts never persist directly. Readers observe either
/// the previous snapshot or the fully updated one, never a partial write.
pub struct FileRepository {
    storage: Arc<dyn StorageCapability>,
    config: WorkspaceConfig,
    state: RwLock<RepositoryState>,
    events: broadcast::Sender<FileEvent>,
}

impl FileRepository {
    pub fn new(storage: Arc<dyn StorageCapability>, config: WorkspaceConfig) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            storage,
            config,
            state: RwLock::new(RepositoryState {
                initialized: false,
                files: FileMap::new(),
                modified: BTreeSet::new(),
            }),
            events,
        }
    }

    /// Subscribe to committed-content changes.
    pub fn subscribe(&self) -> broadcast::Receiver<FileEvent> {
        self.events.subscribe()
    }

    /// Acquire the storage root and load the initial snapshot.
    ///
    /// When consent is refused the repository stays uninitialized and every
    /// dependent operation fails with [`WorkshopError::NotInitialized`]
    /// until a later attempt succeeds.
    pub async fn initialize(&self) -> Result<()> {
        if let Err(err) = self.storage.initialize().await {
            error!("Failed to initialize workspace storage: {}", err);
            return Err(err);
        }
        self.state.write().await.initialized = true;
        self.load_files().await
    }

    /// Recursively enumerate the root and replace the snapshot atomically.
    pub async fn load_files(&self) -> Result<()> {
        self.ensure_initialized().await?;

        let mut files = FileMap::new();
        self.read_directory(String::new(), &mut files).await?;
        let count = files.len();

        self.state.write().await.files = files;
        info!("Loaded workspace snapshot ({} entries)", count);
        let _ = self.events.send(FileEvent::SnapshotReplaced);
        Ok(())
    }

    fn read_directory<'a>(
        &'a self,
        path: String,
        files: &'a mut FileMap,
    ) -> BoxFuture<'a, Result<()>> {
        async move {
            for entry in self.storage.list_children(&path).await? {
                if self.config.is_ignored(&entry.name) {
                    debug!("Skipping ignored entry: {}", entry.name);
                    continue;
                }
                let entry_path = if path.is_empty() {
                    entry.name.clone()
                } else {
                    format!("{}/{}", path, entry.name)
                };
                match entry.kind {
                    EntryKind::Directory => {
                        files.insert(entry_path.clone(), FileNode::Folder);
                        self.read_directory(entry_path, files).await?;
                    }
                    EntryKind::File => {
                        let content = self.storage.read_file(&entry_path).await?;
                        files.insert(entry_path, FileNode::file(content));
                    }
                }
            }
            Ok(())
        }
        .boxed()
    }

    /// Write `content` through the storage capability and commit it to the
    /// snapshot, recording the path as modified.
    ///
    /// Missing parent directories are created segment by segment first. On
    /// any failure the snapshot and the modified set are left untouched.
    pub async fn save_file(&self, path: &str, content: &str) -> Result<()> {
        self.ensure_initialized().await?;

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            return Err(WorkshopError::Storage("cannot save an empty path".to_string()));
        }
        let normalized = segments.join("/");

        let mut parent = String::new();
        for segment in &segments[..segments.len() - 1] {
            parent = if parent.is_empty() {
                (*segment).to_string()
            } else {
                format!("{}/{}", parent, segment)
            };
            self.storage.create_directory(&parent).await?;
        }
        self.storage.write_file(&normalized, content).await?;

        {
            let mut state = self.state.write().await;
            state.files.insert(normalized.clone(), FileNode::file(content));
            state.modified.insert(normalized.clone());
        }
        debug!("Saved file: {}", normalized);
        let _ = self.events.send(FileEvent::FileSaved(normalized));
        Ok(())
    }

    /// Look up a node in the committed snapshot. Never fails.
    pub async fn get_file(&self, path: &str) -> Option<FileNode> {
        self.state.read().await.files.get(path).cloned()
    }

    /// A clone of the committed snapshot.
    pub async fn files(&self) -> FileMap {
        self.state.read().await.files.clone()
    }

    pub async fn file_count(&self) -> usize {
        self.state.read().await.files.len()
    }

    /// Paths written since the last reset, for the diff renderer.
    pub async fn get_file_modifications(&self) -> Vec<String> {
        self.state
            .read()
            .await
            .modified
            .iter()
            .cloned()
            .collect()
    }

    pub async fn reset_file_modifications(&self) {
        self.state.write().await.modified.clear();
    }

    async fn ensure_initialized(&self) -> Result<()> {
        if self.state.read().await.initialized {
            Ok(())
        } else {
            Err(WorkshopError::NotInitialized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::TestStorage;

    fn repository(storage: TestStorage) -> FileRepository {
        FileRepository::new(Arc::new(storage), WorkspaceConfig::default())
    }

    #[tokio::test]
    async fn test_initialize_loads_files_and_folders() {
        let storage = TestStorage::with_files([("a.txt", "hi")]);
        storage.add_directory("dir");
        let repo = repository(storage);

        repo.initialize().await.unwrap();

        let files = repo.files().await;
        assert_eq!(files.len(), 2);
        assert_eq!(files.get("a.txt"), Some(&FileNode::file("hi")));
        assert_eq!(files.get("dir"), Some(&FileNode::Folder));
    }

    #[tokio::test]
    async fn test_nested_tree_is_enumerated_recursively() {
        let storage = TestStorage::with_files([
            ("src/main.rs", "fn main() {}"),
            ("src/lib/util.rs", "pub fn id() {}"),
            ("README.md", "# demo"),
        ]);
        let repo = repository(storage);
        repo.initialize().await.unwrap();

        let files = repo.files().await;
        assert_eq!(files.get("src"), Some(&FileNode::Folder));
        assert_eq!(files.get("src/lib"), Some(&FileNode::Folder));
        assert_eq!(
            files.get("src/lib/util.rs").and_then(FileNode::content),
            Some("pub fn id() {}")
        );
        assert_eq!(files.get("README.md").and_then(FileNode::content), Some("# demo"));
    }

    #[tokio::test]
    async fn test_operations_fail_before_initialize() {
        let repo = repository(TestStorage::new());

        let err = repo.save_file("x/y.txt", "z").await.unwrap_err();
        assert!(matches!(err, WorkshopError::NotInitialized));
        assert!(repo.files().await.is_empty());
    }

    #[tokio::test]
    async fn test_denied_access_leaves_repository_uninitialized() {
        let storage = TestStorage::with_files([("a.txt", "hi")]);
        storage.deny_access(true);
        let repo = FileRepository::new(Arc::new(storage), WorkspaceConfig::default());

        let err = repo.initialize().await.unwrap_err();
        assert!(matches!(err, WorkshopError::AccessDenied));
        let err = repo.load_files().await.unwrap_err();
        assert!(matches!(err, WorkshopError::NotInitialized));
    }

    #[tokio::test]
    async fn test_save_file_creates_parent_directories() {
        let storage = TestStorage::new();
        let repo = repository(storage);
        repo.initialize().await.unwrap();

        repo.save_file("a/b/c.txt", "deep").await.unwrap();

        let files = repo.files().await;
        assert_eq!(files.get("a/b/c.txt"), Some(&FileNode::file("deep")));
        assert_eq!(repo.get_file("a/b/c.txt").await, Some(FileNode::file("deep")));
    }

    #[tokio::test]
    async fn test_failed_save_leaves_snapshot_unchanged() {
        let storage = Arc::new(TestStorage::with_files([("a.txt", "old")]));
        let repo = FileRepository::new(storage.clone(), WorkspaceConfig::default());
        repo.initialize().await.unwrap();

        storage.fail_writes(true);
        assert!(repo.save_file("a.txt", "new").await.is_err());
        assert_eq!(
            repo.get_file("a.txt").await.and_then(|n| n.content().map(String::from)),
            Some("old".to_string())
        );
        assert!(repo.get_file_modifications().await.is_empty());
    }

    #[tokio::test]
    async fn test_modifications_track_distinct_paths_once() {
        let repo = repository(TestStorage::new());
        repo.initialize().await.unwrap();

        repo.save_file("a.txt", "one").await.unwrap();
        repo.save_file("a.txt", "one").await.unwrap();
        repo.save_file("b.txt", "two").await.unwrap();

        let mut modified = repo.get_file_modifications().await;
        modified.sort();
        assert_eq!(modified, ["a.txt", "b.txt"]);

        repo.reset_file_modifications().await;
        assert!(repo.get_file_modifications().await.is_empty());
    }

    #[tokio::test]
    async fn test_ignored_entries_are_pruned_from_snapshot() {
        let storage = TestStorage::with_files([
            ("src/main.rs", "fn main() {}"),
            ("node_modules/pkg/index.js", "module.exports = {}"),
        ]);
        let repo = repository(storage);
        repo.initialize().await.unwrap();

        let files = repo.files().await;
        assert!(files.contains_key("src/main.rs"));
        assert!(!files.keys().any(|path| path.starts_with("node_modules")));
    }

    #[tokio::test]
    async fn test_save_emits_file_event() {
        let repo = repository(TestStorage::new());
        let mut events = repo.subscribe();
        repo.initialize().await.unwrap();
        repo.save_file("a.txt", "hi").await.unwrap();

        // First event is the initial snapshot load.
        assert!(matches!(events.recv().await, Ok(FileEvent::SnapshotReplaced)));
        match events.recv().await {
            Ok(FileEvent::FileSaved(path)) => assert_eq!(path, "a.txt"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_load_files_replaces_prior_snapshot() {
        let storage = TestStorage::with_files([("a.txt", "hi")]);
        let repo = repository(storage);
        repo.initialize().await.unwrap();
        repo.save_file("b.txt", "new").await.unwrap();

        // A fresh enumeration reflects exactly what the store holds now.
        repo.load_files().await.unwrap();
        let files = repo.files().await;
        assert!(files.contains_key("a.txt"));
        assert!(files.contains_key("b.txt"));
    }
}
