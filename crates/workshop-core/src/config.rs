//! Workspace configuration loading

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration file names to search for
pub const CONFIG_FILE_NAMES: &[&str] = &[
    "workshop.config.yaml",
    "workshop.config.yml",
    "workshop.config.json",
];

/// Directory entry names skipped while loading the snapshot.
pub const DEFAULT_IGNORED: &[&str] = &[".git", "node_modules", "target", ".DS_Store"];

/// Workspace configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Optional display name for the workspace.
    #[serde(default)]
    pub name: Option<String>,
    /// Entry names pruned from snapshot loading and watching.
    #[serde(default = "default_ignored")]
    pub ignored: Vec<String>,
}

fn default_ignored() -> Vec<String> {
    DEFAULT_IGNORED.iter().map(|s| s.to_string()).collect()
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            name: None,
            ignored: default_ignored(),
        }
    }
}

impl WorkspaceConfig {
    /// Find a configuration file in a directory.
    pub fn find_config_file(dir: &Path) -> Option<PathBuf> {
        for name in CONFIG_FILE_NAMES {
            let path = dir.join(name);
            if path.exists() {
                return Some(path);
            }
        }
        None
    }

    /// Load configuration from a file, parsed by extension.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = if path.extension().map(|e| e == "json").unwrap_or(false) {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };
        Ok(config)
    }

    /// Load from a directory, falling back to defaults when no config file
    /// is present.
    pub fn load_or_default(dir: &Path) -> Result<Self> {
        match Self::find_config_file(dir) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Whether a directory entry name is pruned during loading.
    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignored.iter().any(|ignored| ignored == name)
    }
}
