//! Workspace snapshot types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Committed snapshot: normalized relative path → entry.
///
/// Ordered so that "first entry" is well defined across loads.
pub type FileMap = BTreeMap<String, FileNode>;

/// One entry in the persisted workspace snapshot.
///
/// Folder entries carry no content and exist only as path markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FileNode {
    #[serde(rename_all = "camelCase")]
    File { content: String, is_binary: bool },
    Folder,
}

impl FileNode {
    /// A text file node. Binary detection happens upstream of the engine.
    pub fn file(content: impl Into<String>) -> Self {
        FileNode::File {
            content: content.into(),
            is_binary: false,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, FileNode::File { .. })
    }

    /// The committed content, or `None` for folders.
    pub fn content(&self) -> Option<&str> {
        match self {
            FileNode::File { content, .. } => Some(content),
            FileNode::Folder => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_node_wire_shape() {
        let node = FileNode::file("hello");
        let value: serde_json::Value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["kind"], "file");
        assert_eq!(value["content"], "hello");
        assert_eq!(value["isBinary"], false);

        let folder: serde_json::Value = serde_json::to_value(FileNode::Folder).unwrap();
        assert_eq!(folder["kind"], "folder");
    }

    #[test]
    fn test_file_map_iterates_in_path_order() {
        let mut files = FileMap::new();
        files.insert("src/main.rs".to_string(), FileNode::file(""));
        files.insert("Cargo.toml".to_string(), FileNode::file(""));
        files.insert("src".to_string(), FileNode::Folder);

        let paths: Vec<&str> = files.keys().map(String::as_str).collect();
        assert_eq!(paths, ["Cargo.toml", "src", "src/main.rs"]);
    }
}
