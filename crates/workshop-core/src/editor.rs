//! Editor draft overlay, independent of committed content

use std::collections::{BTreeMap, BTreeSet};
use workshop_types::{FileMap, FileNode, ScrollPosition};

/// One open document: the committed baseline, the current draft and the
/// remembered scroll offset.
#[derive(Debug, Clone)]
pub struct EditorDocument {
    pub committed: String,
    pub draft: String,
    pub scroll: ScrollPosition,
}

impl EditorDocument {
    /// Unsaved exactly when the draft diverges from the committed content.
    pub fn is_unsaved(&self) -> bool {
        self.draft != self.committed
    }
}

/// Per-path draft overlay and selection state.
///
/// Purely in-memory; persistence always goes through the repository. The
/// unsaved set is a function of the (draft, committed) pairs held here,
/// never stored independently.
#[derive(Debug, Default)]
pub struct EditorModel {
    documents: BTreeMap<String, EditorDocument>,
    selected: Option<String>,
}

impl EditorModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed or refresh open documents from a committed snapshot.
    ///
    /// A draft that has diverged from its committed content is preserved;
    /// clean documents follow the snapshot. Documents whose path vanished
    /// from the snapshot are dropped, as is a selection pointing at one.
    pub fn set_documents(&mut self, files: &FileMap) {
        let mut documents = BTreeMap::new();
        for (path, node) in files {
            if let FileNode::File { content, .. } = node {
                let document = match self.documents.get(path) {
                    Some(open) if open.is_unsaved() => EditorDocument {
                        committed: content.clone(),
                        draft: open.draft.clone(),
                        scroll: open.scroll,
                    },
                    Some(open) => EditorDocument {
                        committed: content.clone(),
                        draft: content.clone(),
                        scroll: open.scroll,
                    },
                    None => EditorDocument {
                        committed: content.clone(),
                        draft: content.clone(),
                        scroll: ScrollPosition::default(),
                    },
                };
                documents.insert(path.clone(), document);
            }
        }
        self.documents = documents;
        if let Some(selected) = &self.selected {
            if !self.documents.contains_key(selected) {
                self.selected = None;
            }
        }
    }

    /// Set the draft for a path. A path without an open document starts
    /// from an empty committed baseline.
    pub fn update_file(&mut self, path: &str, content: impl Into<String>) {
        let document = self
            .documents
            .entry(path.to_string())
            .or_insert_with(|| EditorDocument {
                committed: String::new(),
                draft: String::new(),
                scroll: ScrollPosition::default(),
            });
        document.draft = content.into();
    }

    pub fn document(&self, path: &str) -> Option<&EditorDocument> {
        self.documents.get(path)
    }

    pub fn draft(&self, path: &str) -> Option<&str> {
        self.documents.get(path).map(|doc| doc.draft.as_str())
    }

    pub fn set_selected_file(&mut self, path: Option<String>) {
        self.selected = path;
    }

    pub fn selected_file(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn update_scroll_position(&mut self, path: &str, position: ScrollPosition) {
        if let Some(document) = self.documents.get_mut(path) {
            document.scroll = position;
        }
    }

    pub fn scroll_position(&self, path: &str) -> Option<ScrollPosition> {
        self.documents.get(path).map(|doc| doc.scroll)
    }

    /// Paths whose draft differs from committed content.
    pub fn unsaved_files(&self) -> BTreeSet<String> {
        self.documents
            .iter()
            .filter(|(_, doc)| doc.is_unsaved())
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// Fold the draft into the committed baseline after a successful save.
    pub fn mark_saved(&mut self, path: &str) {
        if let Some(document) = self.documents.get_mut(path) {
            document.committed = document.draft.clone();
        }
    }

    /// Discard the draft, restoring the last committed content.
    pub fn reset(&mut self, path: &str) {
        if let Some(document) = self.documents.get_mut(path) {
            document.draft = document.committed.clone();
        }
    }

    /// Replace both the draft and the committed baseline, e.g. after the
    /// repository committed this path behind the editor's back.
    pub fn restore(&mut self, path: &str, committed: impl Into<String>) {
        if let Some(document) = self.documents.get_mut(path) {
            document.committed = committed.into();
            document.draft = document.committed.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(entries: &[(&str, &str)]) -> FileMap {
        entries
            .iter()
            .map(|(path, content)| (path.to_string(), FileNode::file(*content)))
            .collect()
    }

    #[test]
    fn test_set_documents_seeds_files_only() {
        let mut files = snapshot(&[("a.txt", "one")]);
        files.insert("dir".to_string(), FileNode::Folder);

        let mut editor = EditorModel::new();
        editor.set_documents(&files);

        assert!(editor.document("a.txt").is_some());
        assert!(editor.document("dir").is_none());
    }

    #[test]
    fn test_unsaved_membership_follows_draft() {
        let mut editor = EditorModel::new();
        editor.set_documents(&snapshot(&[("a.txt", "one")]));

        editor.update_file("a.txt", "two");
        assert_eq!(editor.unsaved_files().len(), 1);

        // Drafting the committed content back removes membership.
        editor.update_file("a.txt", "one");
        assert!(editor.unsaved_files().is_empty());
    }

    #[test]
    fn test_refresh_preserves_diverged_draft() {
        let mut editor = EditorModel::new();
        editor.set_documents(&snapshot(&[("a.txt", "one"), ("b.txt", "stale")]));
        editor.update_file("a.txt", "draft");

        editor.set_documents(&snapshot(&[("a.txt", "committed"), ("b.txt", "fresh")]));

        assert_eq!(editor.draft("a.txt"), Some("draft"));
        assert_eq!(editor.document("a.txt").unwrap().committed, "committed");
        // The clean document follows the snapshot.
        assert_eq!(editor.draft("b.txt"), Some("fresh"));
    }

    #[test]
    fn test_vanished_paths_drop_documents_and_selection() {
        let mut editor = EditorModel::new();
        editor.set_documents(&snapshot(&[("a.txt", "one")]));
        editor.set_selected_file(Some("a.txt".to_string()));

        editor.set_documents(&snapshot(&[("b.txt", "two")]));

        assert!(editor.document("a.txt").is_none());
        assert_eq!(editor.selected_file(), None);
    }

    #[test]
    fn test_mark_saved_and_reset() {
        let mut editor = EditorModel::new();
        editor.set_documents(&snapshot(&[("a.txt", "one")]));

        editor.update_file("a.txt", "two");
        editor.mark_saved("a.txt");
        assert!(editor.unsaved_files().is_empty());
        assert_eq!(editor.document("a.txt").unwrap().committed, "two");

        editor.update_file("a.txt", "three");
        editor.reset("a.txt");
        assert_eq!(editor.draft("a.txt"), Some("two"));
    }

    #[test]
    fn test_scroll_position_is_independent_of_content() {
        let mut editor = EditorModel::new();
        editor.set_documents(&snapshot(&[("a.txt", "one")]));

        let position = ScrollPosition { top: 42.0, left: 3.0 };
        editor.update_scroll_position("a.txt", position);
        editor.update_file("a.txt", "two");

        assert_eq!(editor.scroll_position("a.txt"), Some(position));
    }

    #[test]
    fn test_editing_unopened_path_creates_unsaved_draft() {
        let mut editor = EditorModel::new();
        editor.update_file("new.txt", "hello");
        assert!(editor.unsaved_files().contains("new.txt"));
    }
}
