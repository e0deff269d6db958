//! Debounced workspace watcher for external edits

use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{new_debouncer, DebouncedEventKind, Debouncer};
use std::path::{Component, Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::time::Duration;
use workshop_core::{Result, WorkshopError, WorkspaceConfig};

/// Events emitted when the workspace changes outside the engine.
#[derive(Debug, Clone)]
pub enum WatchEvent {
    Changed(PathBuf),
    Error(String),
}

/// Debounced watcher over the workspace root.
///
/// Consumers react by reloading the repository snapshot. Changes under
/// entries in the config ignore list are filtered out before delivery.
pub struct Watcher {
    config: WorkspaceConfig,
    debounce_ms: u64,
    rx: Option<Receiver<WatchEvent>>,
    debouncer: Option<Debouncer<RecommendedWatcher>>,
}

impl Watcher {
    pub fn new(config: WorkspaceConfig) -> Self {
        Self {
            config,
            debounce_ms: 500,
            rx: None,
            debouncer: None,
        }
    }

    /// Set debounce duration in milliseconds
    pub fn with_debounce(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    /// Start watching a directory tree.
    pub fn watch(&mut self, path: &Path) -> Result<()> {
        let (tx, rx) = channel();
        self.rx = Some(rx);

        let ignored = self.config.ignored.clone();
        let mut debouncer = new_debouncer(
            Duration::from_millis(self.debounce_ms),
            move |res: std::result::Result<
                Vec<notify_debouncer_mini::DebouncedEvent>,
                notify::Error,
            >| match res {
                Ok(events) => {
                    for event in events {
                        if !matches!(event.kind, DebouncedEventKind::Any) {
                            continue;
                        }
                        if is_ignored(&event.path, &ignored) {
                            continue;
                        }
                        let _ = tx.send(WatchEvent::Changed(event.path.clone()));
                    }
                }
                Err(e) => {
                    let _ = tx.send(WatchEvent::Error(e.to_string()));
                }
            },
        )
        .map_err(|e| WorkshopError::Watch(e.to_string()))?;

        debouncer
            .watcher()
            .watch(path, RecursiveMode::Recursive)
            .map_err(|e| WorkshopError::Watch(e.to_string()))?;

        self.debouncer = Some(debouncer);
        Ok(())
    }

    /// Get the next event (blocking)
    pub fn next_event(&self) -> Option<WatchEvent> {
        self.rx.as_ref().and_then(|rx| rx.recv().ok())
    }

    /// Try to get the next event (non-blocking)
    pub fn try_next_event(&self) -> Option<WatchEvent> {
        self.rx.as_ref().and_then(|rx| rx.try_recv().ok())
    }
}

fn is_ignored(path: &Path, ignored: &[String]) -> bool {
    path.components().any(|component| match component {
        Component::Normal(name) => ignored
            .iter()
            .any(|entry| name.to_string_lossy() == entry.as_str()),
        _ => false,
    })
}
