//! Command-execution boundary

use crate::error::{Result, WorkshopError};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::info;
use workshop_types::CommandOutput;

/// Executes shell and start commands on behalf of an action runner.
///
/// Long-running implementations should honor the supplied token; the
/// runner cancels it when the owning artifact is aborted.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &str, cancel: CancellationToken) -> Result<CommandOutput>;
}

/// Dry-run boundary used until a real process backend is attached.
///
/// Logs the requested command and reports success without running
/// anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedCommandRunner;

#[async_trait]
impl CommandRunner for SimulatedCommandRunner {
    async fn run(&self, command: &str, cancel: CancellationToken) -> Result<CommandOutput> {
        if cancel.is_cancelled() {
            return Err(WorkshopError::Other("command cancelled".to_string()));
        }
        info!("Command execution requested: {}", command);
        Ok(CommandOutput {
            output: "Command executed successfully".to_string(),
            exit_code: 0,
        })
    }
}
