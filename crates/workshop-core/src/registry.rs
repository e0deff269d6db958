//! Artifact registry — one action runner per assistant turn

use crate::error::{Result, WorkshopError};
use crate::executor::ActionExecutor;
use crate::ports::CommandRunner;
use crate::repository::FileRepository;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use workshop_types::{Action, ActionState, ArtifactSummary, ArtifactUpdate};

/// One artifact: the group of actions belonging to a single assistant
/// message, with its dedicated runner.
#[derive(Clone)]
pub struct Artifact {
    pub id: String,
    pub title: String,
    pub closed: bool,
    pub runner: Arc<ActionExecutor>,
}

impl Artifact {
    pub fn summary(&self) -> ArtifactSummary {
        ArtifactSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            closed: self.closed,
        }
    }
}

struct RegistryState {
    artifacts: HashMap<String, Artifact>,
    order: Vec<String>,
}

/// Maps a message identifier to its artifact and runner, preserving
/// first-seen order.
pub struct ArtifactRegistry {
    repository: Arc<FileRepository>,
    runner: Arc<dyn CommandRunner>,
    state: RwLock<RegistryState>,
}

impl ArtifactRegistry {
    pub fn new(repository: Arc<FileRepository>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            repository,
            runner,
            state: RwLock::new(RegistryState {
                artifacts: HashMap::new(),
                order: Vec::new(),
            }),
        }
    }

    /// Register an artifact with a fresh runner.
    ///
    /// A no-op when the id is already known, so replayed registrations
    /// never reset state or spawn a second runner.
    pub async fn add_artifact(&self, id: impl Into<String>, title: impl Into<String>) {
        let id = id.into();
        let mut state = self.state.write().await;
        if state.artifacts.contains_key(&id) {
            return;
        }
        debug!("Registered artifact: {}", id);
        state.order.push(id.clone());
        let artifact = Artifact {
            id: id.clone(),
            title: title.into(),
            closed: false,
            runner: Arc::new(ActionExecutor::new(
                self.repository.clone(),
                self.runner.clone(),
            )),
        };
        state.artifacts.insert(id, artifact);
    }

    /// Merge a presentational patch into an artifact. Unknown ids are
    /// silently ignored.
    pub async fn update_artifact(&self, id: &str, update: ArtifactUpdate) {
        let mut state = self.state.write().await;
        if let Some(artifact) = state.artifacts.get_mut(id) {
            if let Some(title) = update.title {
                artifact.title = title;
            }
            if let Some(closed) = update.closed {
                artifact.closed = closed;
            }
        }
    }

    /// Run an action on the addressed artifact's executor and await its
    /// terminal state, keeping actions of one artifact in declaration
    /// order.
    pub async fn run_action(&self, id: &str, action: Action) -> Result<ActionState> {
        let runner = self
            .runner_for(id)
            .await
            .ok_or_else(|| WorkshopError::ArtifactNotFound(id.to_string()))?;
        Ok(runner.run_action(action).await)
    }

    /// Queue an action for the artifact. The local engine executes actions
    /// as they arrive, so this is [`Self::run_action`] under another entry
    /// point of the parser callback contract.
    pub async fn add_action(&self, id: &str, action: Action) -> Result<ActionState> {
        self.run_action(id, action).await
    }

    /// Abort the artifact's runner; sibling artifacts are unaffected.
    pub async fn abort_artifact(&self, id: &str) -> Result<()> {
        let runner = self
            .runner_for(id)
            .await
            .ok_or_else(|| WorkshopError::ArtifactNotFound(id.to_string()))?;
        runner.abort();
        Ok(())
    }

    /// The artifact registered first, if any.
    pub async fn first_artifact(&self) -> Option<ArtifactSummary> {
        let state = self.state.read().await;
        let first_id = state.order.first()?;
        state.artifacts.get(first_id).map(Artifact::summary)
    }

    pub async fn artifact(&self, id: &str) -> Option<ArtifactSummary> {
        self.state.read().await.artifacts.get(id).map(Artifact::summary)
    }

    /// Handle to the artifact's executor, e.g. for progress UIs that need
    /// the abort capability.
    pub async fn runner_for(&self, id: &str) -> Option<Arc<ActionExecutor>> {
        self.state
            .read()
            .await
            .artifacts
            .get(id)
            .map(|artifact| artifact.runner.clone())
    }

    pub async fn artifact_count(&self) -> usize {
        self.state.read().await.artifacts.len()
    }
}
