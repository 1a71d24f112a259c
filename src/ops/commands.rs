use serde::Serialize;

use crate::error::ExecError;
use crate::exec::ExecResult;
use crate::safety::SafetyLayer;

/// Outcome of a shell command as reported to the user and the agent.
#[derive(Debug, Clone, Serialize)]
pub struct CommandResult {
    pub command: String,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    pub blocked: bool,
}

impl CommandResult {
    fn from_exec(command: &str, exec: ExecResult) -> Self {
        Self {
            command: command.to_string(),
            success: exec.succeeded(),
            stdout: exec.stdout,
            stderr: exec.stderr,
            exit_code: exec.exit_code,
            timed_out: exec.timed_out,
            blocked: exec.blocked,
        }
    }
}

/// CLI operations collaborator. Every command goes through the safety layer.
pub struct CliOperations {
    safety: SafetyLayer,
}

impl CliOperations {
    pub fn new(safety: SafetyLayer) -> Self {
        Self { safety }
    }

    pub async fn execute_command(&self, command: &str) -> Result<CommandResult, ExecError> {
        tracing::debug!(command, "Executing shell command");
        let exec = self.safety.execute(command).await?;
        Ok(CommandResult::from_exec(command, exec))
    }
}
