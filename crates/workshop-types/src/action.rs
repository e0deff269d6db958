//! Action types emitted by the assistant stream

use serde::{Deserialize, Serialize};

/// One declarative mutation request parsed from the assistant's output.
///
/// The wire shape is internally tagged on `type`, matching what the
/// streaming parser emits; a tag outside this enum fails deserialization
/// at the input boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Action {
    /// Write `content` to `file_path`, creating parent directories as needed.
    #[serde(rename_all = "camelCase")]
    File { file_path: String, content: String },
    /// Run a one-shot shell command.
    Shell { content: String },
    /// Start a long-lived command such as a dev server.
    Start { content: String },
}

impl Action {
    /// The raw content payload of the action.
    pub fn content(&self) -> &str {
        match self {
            Action::File { content, .. } => content,
            Action::Shell { content } => content,
            Action::Start { content } => content,
        }
    }

    /// Whether the action runs through the command-execution boundary.
    pub fn is_command(&self) -> bool {
        matches!(self, Action::Shell { .. } | Action::Start { .. })
    }
}

/// Lifecycle of a single action.
///
/// `Pending → Running → Complete | Failed`; terminal states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Pending,
    Running,
    Complete,
    Failed,
}

impl ActionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ActionStatus::Complete | ActionStatus::Failed)
    }
}

/// Result of the command-execution boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandOutput {
    pub output: String,
    pub exit_code: i32,
}

/// Progress snapshot of one action, consumed by UI collaborators.
///
/// Aborting happens through the owning artifact's runner handle; a
/// serialized state cannot carry the cancellation callback itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionState {
    #[serde(flatten)]
    pub action: Action,
    pub status: ActionStatus,
    pub executed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionState {
    /// State of an action that has started but not reached a terminal state.
    pub fn running(action: Action) -> Self {
        Self {
            action,
            status: ActionStatus::Running,
            executed: false,
            output: None,
            exit_code: None,
            error: None,
        }
    }

    /// Terminal success without command output.
    pub fn complete(action: Action) -> Self {
        Self {
            action,
            status: ActionStatus::Complete,
            executed: true,
            output: None,
            exit_code: None,
            error: None,
        }
    }

    /// Terminal success carrying the command boundary's output.
    pub fn complete_with_output(action: Action, output: CommandOutput) -> Self {
        Self {
            action,
            status: ActionStatus::Complete,
            executed: true,
            output: Some(output.output),
            exit_code: Some(output.exit_code),
            error: None,
        }
    }

    /// Terminal failure with a message; the engine never raises these.
    pub fn failed(action: Action, error: impl Into<String>) -> Self {
        Self {
            action,
            status: ActionStatus::Failed,
            executed: false,
            output: None,
            exit_code: None,
            error: Some(error.into()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
