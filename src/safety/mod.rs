pub mod command_filter;
pub mod defaults;
pub mod workspace;

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use command_filter::{BlockedCommand, CommandFilter};
use workspace::WorkspaceGuard;

use crate::config::AppConfig;
use crate::error::ExecError;
use crate::exec::{ExecResult, execute_shell};

/// Exit code reported for commands the filter refused to run.
pub const BLOCKED_EXIT_CODE: i32 = 126;

/// Combined safety layer: checks commands against the blocklist, pins them
/// to the workspace directory, and runs allowed ones with a timeout.
///
/// This is the single entry point for shell execution. Nothing else calls
/// [`execute_shell`] directly.
pub struct SafetyLayer {
    command_filter: CommandFilter,
    workspace_guard: WorkspaceGuard,
    timeout_secs: u64,
    security_log_path: PathBuf,
}

impl SafetyLayer {
    /// Build a SafetyLayer from the resolved application configuration.
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let command_filter = CommandFilter::new(&config.blocked_patterns)
            .map_err(|e| anyhow::anyhow!("Failed to compile command filter patterns: {}", e))?;

        let workspace_guard = WorkspaceGuard::new(&config.workspace)
            .map_err(|e| anyhow::anyhow!("Failed to initialize workspace guard: {}", e))?;

        tracing::debug!(
            workspace = %workspace_guard.canonical_root().display(),
            timeout_secs = config.shell_timeout_secs,
            blocklist_patterns = command_filter.len(),
            "Safety layer initialized"
        );

        Ok(Self {
            command_filter,
            workspace_guard,
            timeout_secs: config.shell_timeout_secs,
            security_log_path: config.security_log_path.clone(),
        })
    }

    /// Execute a shell command through the safety pipeline.
    ///
    /// A blocked command is not run: it is appended to the security log and
    /// reported as an [`ExecResult`] with the blocked JSON on `stderr` and
    /// exit code 126. Allowed commands run in the workspace root.
    pub async fn execute(&self, command: &str) -> Result<ExecResult, ExecError> {
        if let Some(blocked) = self.command_filter.check(command) {
            tracing::warn!(command, reason = %blocked.reason, "Command blocked");
            self.log_blocked_command(&blocked);

            return Ok(ExecResult {
                stdout: String::new(),
                stderr: blocked.to_json(),
                exit_code: Some(BLOCKED_EXIT_CODE),
                timed_out: false,
                blocked: true,
            });
        }

        execute_shell(command, self.workspace_guard.canonical_root(), self.timeout_secs).await
    }

    pub fn workspace_root(&self) -> &Path {
        self.workspace_guard.canonical_root()
    }

    pub fn guard(&self) -> &WorkspaceGuard {
        &self.workspace_guard
    }

    /// Append one JSON line per blocked command. A log that cannot be written
    /// is reported through tracing and otherwise ignored.
    fn log_blocked_command(&self, blocked: &BlockedCommand) {
        let entry = serde_json::json!({
            "timestamp": chrono::Utc::now().timestamp(),
            "blocked": true,
            "reason": blocked.reason,
            "command": blocked.command,
        });

        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.security_log_path)
            .and_then(|mut file| writeln!(file, "{entry}"));

        if let Err(e) = result {
            tracing::warn!(
                "Failed to write to security log at {}: {}",
                self.security_log_path.display(),
                e
            );
        }
    }
}
