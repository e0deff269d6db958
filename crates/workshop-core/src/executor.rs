//! Per-artifact action runner

use crate::ports::CommandRunner;
use crate::repository::FileRepository;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use workshop_types::{Action, ActionState};

/// Executes one action at a time on behalf of a single artifact.
///
/// Owns exactly one cancellation token for its whole lifetime; aborting it
/// affects only this artifact's in-flight and queued actions, never those
/// of a sibling artifact.
pub struct ActionExecutor {
    repository: Arc<FileRepository>,
    runner: Arc<dyn CommandRunner>,
    cancel: CancellationToken,
    run_lock: Mutex<()>,
}

impl ActionExecutor {
    pub fn new(repository: Arc<FileRepository>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            repository,
            runner,
            cancel: CancellationToken::new(),
            run_lock: Mutex::new(()),
        }
    }

    /// The token observed by this artifact's actions.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancel the in-flight action (where the command boundary honors the
    /// token) and fail every action queued after it.
    pub fn abort(&self) {
        info!("Aborting action runner");
        self.cancel.cancel();
    }

    pub fn is_aborted(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Run one action to a terminal state.
    ///
    /// Actions of one artifact are serialized: a later action only starts
    /// once the previous one has reached `Complete` or `Failed`, since it
    /// may depend on a file written by its predecessor. Storage and
    /// command failures are folded into the returned state, never raised.
    pub async fn run_action(&self, action: Action) -> ActionState {
        let _guard = self.run_lock.lock().await;

        if self.cancel.is_cancelled() {
            return ActionState::failed(action, "action runner was aborted");
        }

        match &action {
            Action::File { file_path, content } => {
                // The token is deliberately not consulted mid-write: a write
                // either fully completes or fully fails, so an abort cannot
                // leave a partially written file visible.
                match self.repository.save_file(file_path, content).await {
                    Ok(()) => {
                        info!("Wrote file: {}", file_path);
                        ActionState::complete(action.clone())
                    }
                    Err(err) => {
                        warn!("File action failed for {}: {}", file_path, err);
                        ActionState::failed(action.clone(), err.to_string())
                    }
                }
            }
            Action::Shell { content } | Action::Start { content } => {
                match self.runner.run(content, self.cancel.clone()).await {
                    Ok(output) => ActionState::complete_with_output(action.clone(), output),
                    Err(err) => {
                        warn!("Command action failed: {}", err);
                        ActionState::failed(action.clone(), err.to_string())
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorkspaceConfig;
    use crate::ports::SimulatedCommandRunner;
    use crate::testutil::{DelayedRunner, HangingRunner, TestStorage};
    use workshop_types::{ActionStatus, FileNode};

    async fn initialized_repository(storage: TestStorage) -> Arc<FileRepository> {
        let repo = Arc::new(FileRepository::new(
            Arc::new(storage),
            WorkspaceConfig::default(),
        ));
        repo.initialize().await.unwrap();
        repo
    }

    fn file_action(path: &str, content: &str) -> Action {
        Action::File {
            file_path: path.to_string(),
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn test_file_action_commits_and_completes() {
        let repo = initialized_repository(TestStorage::new()).await;
        let executor = ActionExecutor::new(repo.clone(), Arc::new(SimulatedCommandRunner));

        let state = executor.run_action(file_action("x/y.txt", "z")).await;

        assert_eq!(state.status, ActionStatus::Complete);
        assert!(state.executed);
        assert_eq!(repo.get_file("x/y.txt").await, Some(FileNode::file("z")));
    }

    #[tokio::test]
    async fn test_writes_apply_in_declaration_order() {
        let repo = initialized_repository(TestStorage::new()).await;
        let executor = ActionExecutor::new(repo.clone(), Arc::new(SimulatedCommandRunner));

        for (index, content) in ["first", "second", "third"].into_iter().enumerate() {
            let state = executor
                .run_action(file_action("steps.txt", content))
                .await;
            assert!(state.is_terminal(), "action {} not terminal", index);
        }

        assert_eq!(
            repo.get_file("steps.txt").await.and_then(|n| n.content().map(String::from)),
            Some("third".to_string())
        );
    }

    #[tokio::test]
    async fn test_command_actions_use_the_boundary() {
        let repo = initialized_repository(TestStorage::new()).await;
        let executor = ActionExecutor::new(repo, Arc::new(SimulatedCommandRunner));

        let state = executor
            .run_action(Action::Shell {
                content: "npm install".to_string(),
            })
            .await;

        assert_eq!(state.status, ActionStatus::Complete);
        assert_eq!(state.exit_code, Some(0));
        assert_eq!(state.output.as_deref(), Some("Command executed successfully"));
    }

    #[tokio::test]
    async fn test_write_failure_becomes_failed_state() {
        let storage = Arc::new(TestStorage::new());
        let repo = Arc::new(FileRepository::new(
            storage.clone(),
            WorkspaceConfig::default(),
        ));
        repo.initialize().await.unwrap();
        storage.fail_writes(true);

        let executor = ActionExecutor::new(repo.clone(), Arc::new(SimulatedCommandRunner));
        let state = executor.run_action(file_action("a.txt", "hi")).await;

        assert_eq!(state.status, ActionStatus::Failed);
        assert!(!state.executed);
        assert!(state.error.is_some());
        assert_eq!(repo.get_file("a.txt").await, None);
    }

    #[tokio::test]
    async fn test_aborted_runner_fails_subsequent_actions() {
        let repo = initialized_repository(TestStorage::new()).await;
        let executor = ActionExecutor::new(repo.clone(), Arc::new(SimulatedCommandRunner));

        executor.abort();
        let state = executor.run_action(file_action("a.txt", "hi")).await;

        assert_eq!(state.status, ActionStatus::Failed);
        assert_eq!(repo.get_file("a.txt").await, None);
    }

    #[tokio::test]
    async fn test_abort_interrupts_in_flight_command() {
        let repo = initialized_repository(TestStorage::new()).await;
        let executor = Arc::new(ActionExecutor::new(repo, Arc::new(HangingRunner)));

        let running = {
            let executor = executor.clone();
            tokio::spawn(async move {
                executor
                    .run_action(Action::Start {
                        content: "npm run dev".to_string(),
                    })
                    .await
            })
        };
        tokio::task::yield_now().await;
        executor.abort();

        let state = running.await.unwrap();
        assert_eq!(state.status, ActionStatus::Failed);
    }

    #[tokio::test]
    async fn test_abort_is_scoped_to_one_runner() {
        let repo = initialized_repository(TestStorage::new()).await;
        let aborted = Arc::new(ActionExecutor::new(repo.clone(), Arc::new(HangingRunner)));
        let other = Arc::new(ActionExecutor::new(
            repo.clone(),
            Arc::new(DelayedRunner { delay_ms: 50 }),
        ));

        let hanging = {
            let aborted = aborted.clone();
            tokio::spawn(async move {
                aborted
                    .run_action(Action::Shell {
                        content: "sleep 100".to_string(),
                    })
                    .await
            })
        };
        let in_flight = {
            let other = other.clone();
            tokio::spawn(async move {
                other
                    .run_action(Action::Shell {
                        content: "echo ok".to_string(),
                    })
                    .await
            })
        };

        tokio::task::yield_now().await;
        aborted.abort();

        let failed = hanging.await.unwrap();
        let completed = in_flight.await.unwrap();
        assert_eq!(failed.status, ActionStatus::Failed);
        assert_eq!(completed.status, ActionStatus::Complete);
        assert_eq!(completed.output.as_deref(), Some("ran: echo ok"));
    }
}
