//! The command dispatcher: turns one line of input into one action.
//!
//! [`Dispatcher::run_task`] is the one-shot path used when a task is given
//! on the command line. [`Dispatcher::run_interactive`] is the REPL: read a
//! line, classify it with [`Command::parse`], dispatch, render, repeat. A
//! failed command is printed and the loop carries on; Ctrl+C abandons
//! whatever is in flight (input or command) and re-prompts.

pub mod command;
pub mod render;

use std::future::Future;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::agent::{Agent, TaskResult};
use crate::error::DispatchError;
use crate::ops::{CliOperations, FileOperations, Toolkit};

pub use command::{CREATE_TARGET, Command};

/// What the REPL does after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Dispatcher<A> {
    workspace: PathBuf,
    agent: A,
    files: Arc<FileOperations>,
    cli: Arc<CliOperations>,
}

impl<A: Agent> Dispatcher<A> {
    pub fn new(agent: A, toolkit: &Toolkit) -> Self {
        Self {
            workspace: toolkit.files.workspace().to_path_buf(),
            agent,
            files: Arc::clone(&toolkit.files),
            cli: Arc::clone(&toolkit.cli),
        }
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn agent(&self) -> &A {
        &self.agent
    }

    /// Hand `task` to the agent, framed by a banner and a status/step summary.
    pub async fn run_task<W: Write>(
        &mut self,
        task: &str,
        out: &mut W,
    ) -> Result<TaskResult, DispatchError> {
        tracing::info!(task, "Dispatching task to agent");
        render::task_banner(out, task, &self.workspace)?;

        let result = self.agent.execute_autonomous(task).await?;

        render::task_summary(out, &result)?;
        Ok(result)
    }

    /// Execute one classified command and render its outcome.
    pub async fn dispatch<W: Write>(
        &mut self,
        command: Command,
        out: &mut W,
    ) -> Result<Flow, DispatchError> {
        match command {
            Command::Empty => {}
            Command::Exit => {
                render::farewell(out)?;
                return Ok(Flow::Exit);
            }
            Command::Help => write!(out, "{}", render::HELP_TEXT)?,
            Command::Status => {
                let status = self.agent.get_status()?;
                render::status(out, &status)?;
            }
            Command::Create { content } => {
                let message = self.files.create_file(CREATE_TARGET, &content).await?;
                render::created(out, &message)?;
            }
            Command::Read { filename } => {
                let contents = self.files.read_file(&filename).await?;
                render::file_contents(out, &contents)?;
            }
            Command::Run { command } => {
                let result = self.cli.execute_command(&command).await?;
                render::command_result(out, &result)?;
            }
            Command::Task(task) => {
                let result = self.run_task(&task, out).await?;
                render::task_result(out, &result)?;
            }
        }
        Ok(Flow::Continue)
    }

    /// Run the REPL on `input` until `exit` or end of input, with Ctrl+C as
    /// the interrupt.
    pub async fn run_interactive<R, W>(&mut self, input: R, out: &mut W) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        self.run_interactive_with(input, out, ctrl_c).await
    }

    /// The REPL with a caller-supplied interrupt source. `interrupt` is
    /// called afresh for every input read and every dispatch; when its
    /// future resolves first, the pending read or command is dropped.
    ///
    /// Only failures to write `out` (or to read `input`) end the loop early.
    pub async fn run_interactive_with<R, W, I, F>(
        &mut self,
        input: R,
        out: &mut W,
        mut interrupt: I,
    ) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
        I: FnMut() -> F,
        F: Future<Output = ()>,
    {
        render::intro(out)?;
        let mut lines = input.lines();

        loop {
            render::prompt(out)?;

            let read = tokio::select! {
                line = lines.next_line() => Some(line),
                _ = interrupt() => None,
            };
            let line = match read {
                None => {
                    render::interrupted(out)?;
                    continue;
                }
                Some(Ok(Some(line))) => line,
                Some(Ok(None)) => {
                    tracing::debug!("End of input, leaving interactive mode");
                    writeln!(out)?;
                    break;
                }
                Some(Err(e)) if e.kind() == io::ErrorKind::InvalidData => {
                    render::error(out, &e)?;
                    continue;
                }
                Some(Err(e)) => return Err(e),
            };

            let command = Command::parse(&line);
            if command == Command::Empty {
                continue;
            }

            let outcome = tokio::select! {
                res = self.dispatch(command, out) => Some(res),
                _ = interrupt() => None,
            };
            match outcome {
                None => render::interrupted(out)?,
                Some(Ok(Flow::Exit)) => break,
                Some(Ok(Flow::Continue)) => {}
                Some(Err(e)) => {
                    tracing::debug!(error = ?e, "Command failed");
                    render::error(out, &e)?;
                }
            }
        }

        Ok(())
    }
}

/// Resolves on Ctrl+C. If the signal handler cannot be installed the REPL
/// simply runs without interrupt support.
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
}
