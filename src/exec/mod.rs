//! Shell command execution with timeout enforcement.
//!
//! Commands run via `sh -c` in their own process group so that a timeout can
//! take down the whole tree (pipelines, `&` jobs) with a single `killpg`.

mod shell;

pub use shell::ExecResult;

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use nix::sys::signal::{Signal, killpg};
use nix::unistd::Pid;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;

use crate::error::ExecError;

/// Run `command` through `sh -c` with `cwd` as the working directory.
///
/// Stdout and stderr are captured in full. If the process has not exited
/// after `timeout_secs`, its process group is sent SIGKILL, the child is
/// reaped, and the partial output is returned with `timed_out: true` and no
/// exit code.
///
/// Dropping the returned future before it completes (Ctrl+C in the REPL)
/// also kills the process group.
pub async fn execute_shell(
    command: &str,
    cwd: &Path,
    timeout_secs: u64,
) -> Result<ExecResult, ExecError> {
    let mut child = Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(cwd)
        .process_group(0)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| ExecError::SpawnFailed(e.to_string()))?;
    let mut group = GroupKill::new(child.id());

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| ExecError::SpawnFailed("failed to capture stdout".into()))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| ExecError::SpawnFailed("failed to capture stderr".into()))?;

    let stdout_task = spawn_reader(stdout);
    let stderr_task = spawn_reader(stderr);

    let waited = tokio::time::timeout(Duration::from_secs(timeout_secs), child.wait()).await;

    let (exit_code, timed_out) = match waited {
        Ok(Ok(status)) => (status.code(), false),
        Ok(Err(e)) => return Err(ExecError::ProcessFailed(e.to_string())),
        Err(_) => {
            tracing::warn!(command, timeout_secs, "Shell command timed out, killing process group");
            group.kill();
            // Reap the child to prevent zombies.
            let _ = child.wait().await;
            (None, true)
        }
    };

    let stdout = collect(stdout_task).await;
    let stderr = collect(stderr_task).await;
    group.disarm();

    Ok(ExecResult {
        stdout,
        stderr,
        exit_code,
        timed_out,
        blocked: false,
    })
}

/// SIGKILLs the shell's process group when dropped while still armed.
///
/// `kill_on_drop` only reaches `sh` itself; background jobs and pipeline
/// members share its group and would outlive an abandoned command.
struct GroupKill {
    pgid: Option<Pid>,
}

impl GroupKill {
    fn new(pid: Option<u32>) -> Self {
        Self {
            pgid: pid.map(|pid| Pid::from_raw(pid as i32)),
        }
    }

    fn kill(&self) {
        if let Some(pgid) = self.pgid {
            let _ = killpg(pgid, Signal::SIGKILL);
        }
    }

    /// The command ran to completion and its pipes are closed.
    fn disarm(&mut self) {
        self.pgid = None;
    }
}

impl Drop for GroupKill {
    fn drop(&mut self) {
        if self.pgid.is_some() {
            tracing::debug!(pgid = ?self.pgid, "Shell command abandoned, killing process group");
            self.kill();
        }
    }
}

fn spawn_reader<R>(mut pipe: R) -> JoinHandle<Vec<u8>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf).await;
        buf
    })
}

async fn collect(task: JoinHandle<Vec<u8>>) -> String {
    let bytes = task.await.unwrap_or_default();
    String::from_utf8_lossy(&bytes).into_owned()
}
