//! Workbench — composition root over repository, registry and editor

use crate::config::WorkspaceConfig;
use crate::editor::{EditorDocument, EditorModel};
use crate::error::Result;
use crate::ports::{CommandRunner, StorageCapability};
use crate::registry::ArtifactRegistry;
use crate::repository::{FileEvent, FileRepository};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::info;
use workshop_types::{
    Action, ActionState, ArtifactSummary, ArtifactUpdate, FileMap, ScrollPosition,
};

/// Composition root reconciling editor drafts with committed content and
/// routing parsed actions to their artifact runners.
///
/// Constructed once at startup and passed by reference to its consumers;
/// tests build isolated instances over an in-memory storage capability.
pub struct Workbench {
    repository: Arc<FileRepository>,
    registry: ArtifactRegistry,
    editor: RwLock<EditorModel>,
}

impl Workbench {
    pub fn new(
        storage: Arc<dyn StorageCapability>,
        runner: Arc<dyn CommandRunner>,
        config: WorkspaceConfig,
    ) -> Self {
        let repository = Arc::new(FileRepository::new(storage, config));
        let registry = ArtifactRegistry::new(repository.clone(), runner);
        Self {
            repository,
            registry,
            editor: RwLock::new(EditorModel::new()),
        }
    }

    /// Shared handle to the underlying repository.
    pub fn repository(&self) -> Arc<FileRepository> {
        self.repository.clone()
    }

    /// Subscribe to committed-content changes.
    pub fn subscribe(&self) -> broadcast::Receiver<FileEvent> {
        self.repository.subscribe()
    }

    /// Initialize storage, load the snapshot and open the editor documents.
    pub async fn initialize(&self) -> Result<()> {
        self.repository.initialize().await?;
        self.refresh_documents().await;
        Ok(())
    }

    /// Re-seed editor documents from the current committed snapshot.
    pub async fn refresh_documents(&self) {
        let files = self.repository.files().await;
        self.set_documents(&files).await;
    }

    /// Seed or refresh open-document state from a snapshot, auto-selecting
    /// the first file entry when nothing is selected yet.
    pub async fn set_documents(&self, files: &FileMap) {
        let mut editor = self.editor.write().await;
        editor.set_documents(files);

        if editor.selected_file().is_none() {
            let first_file = files
                .iter()
                .find(|(_, node)| node.is_file())
                .map(|(path, _)| path.clone());
            if let Some(path) = first_file {
                info!("Selecting initial document: {}", path);
                editor.set_selected_file(Some(path));
            }
        }
    }

    /// Commit the draft for `path` and clear its unsaved membership.
    /// Paths without an open document are ignored.
    pub async fn save_file(&self, path: &str) -> Result<()> {
        let draft = self
            .editor
            .read()
            .await
            .draft(path)
            .map(|draft| draft.to_string());
        let draft = match draft {
            Some(draft) => draft,
            None => return Ok(()),
        };

        self.repository.save_file(path, &draft).await?;
        self.editor.write().await.mark_saved(path);
        Ok(())
    }

    /// Save every path whose draft diverges from committed content. Order
    /// across paths is unspecified.
    pub async fn save_all_files(&self) -> Result<()> {
        let unsaved = self.editor.read().await.unsaved_files();
        for path in unsaved {
            self.save_file(&path).await?;
        }
        Ok(())
    }

    /// Replace the selected document's draft.
    pub async fn update_current_document(&self, content: &str) {
        let mut editor = self.editor.write().await;
        if let Some(path) = editor.selected_file().map(str::to_string) {
            editor.update_file(&path, content);
        }
    }

    /// Discard the selected document's draft, restoring the last content
    /// committed to the repository.
    pub async fn reset_current_document(&self) {
        let path = self.editor.read().await.selected_file().map(str::to_string);
        let path = match path {
            Some(path) => path,
            None => return,
        };

        let committed = self
            .repository
            .get_file(&path)
            .await
            .and_then(|node| node.content().map(str::to_string));
        let mut editor = self.editor.write().await;
        match committed {
            Some(content) => editor.restore(&path, content),
            None => editor.reset(&path),
        }
    }

    pub async fn select_file(&self, path: Option<String>) {
        self.editor.write().await.set_selected_file(path);
    }

    pub async fn selected_file(&self) -> Option<String> {
        self.editor.read().await.selected_file().map(str::to_string)
    }

    /// Update the selected document's scroll offset.
    pub async fn update_scroll_position(&self, position: ScrollPosition) {
        let mut editor = self.editor.write().await;
        if let Some(path) = editor.selected_file().map(str::to_string) {
            editor.update_scroll_position(&path, position);
        }
    }

    pub async fn document(&self, path: &str) -> Option<EditorDocument> {
        self.editor.read().await.document(path).cloned()
    }

    pub async fn unsaved_files(&self) -> BTreeSet<String> {
        self.editor.read().await.unsaved_files()
    }

    // Artifact routing. Missing artifacts are fatal, preserving the
    // registry's desynchronization contract.

    pub async fn add_artifact(&self, id: impl Into<String>, title: impl Into<String>) {
        self.registry.add_artifact(id, title).await;
    }

    pub async fn update_artifact(&self, id: &str, update: ArtifactUpdate) {
        self.registry.update_artifact(id, update).await;
    }

    pub async fn add_action(&self, id: &str, action: Action) -> Result<ActionState> {
        self.registry.add_action(id, action).await
    }

    pub async fn run_action(&self, id: &str, action: Action) -> Result<ActionState> {
        self.registry.run_action(id, action).await
    }

    pub async fn abort_artifact(&self, id: &str) -> Result<()> {
        self.registry.abort_artifact(id).await
    }

    pub async fn first_artifact(&self) -> Option<ArtifactSummary> {
        self.registry.first_artifact().await
    }

    pub async fn artifact(&self, id: &str) -> Option<ArtifactSummary> {
        self.registry.artifact(id).await
    }

    /// Paths written since the last reset, for the diff renderer.
    pub async fn file_modifications(&self) -> Vec<String> {
        self.repository.get_file_modifications().await
    }

    pub async fn reset_file_modifications(&self) {
        self.repository.reset_file_modifications().await
    }
}
