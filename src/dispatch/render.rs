//! Text the REPL prints. Kept together so the wording is easy to find.

use std::io::{self, Write};
use std::path::Path;

use crate::agent::{AgentStatus, TaskResult};
use crate::ops::CommandResult;

/// Characters of command stdout shown after `run`.
pub const OUTPUT_PREVIEW_CHARS: usize = 200;

const RULE_WIDTH: usize = 60;

pub const HELP_TEXT: &str = "
📚 njagu commands:

🤖 Autonomous tasks:
  Any other input is handed to the agent as a task
  Example: \"Write a Python web scraper for news\"

📁 File operations:
  create <content>     - Write <content> to user_file.txt in the workspace
  read <filename>      - Print a file's contents

⚡ CLI operations:
  run <command>        - Execute a shell command in the workspace

ℹ️  System commands:
  status               - Show agent status
  help                 - Show this help
  exit                 - Leave interactive mode

💡 The agent breaks a task into steps, runs them with its tools,
   and reports the outcome when it is done.
";

pub fn rule(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))
}

pub fn intro(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "\n🤖 njagu - Interactive Mode")?;
    writeln!(out, "Type 'help' for commands, 'exit' to quit")?;
    rule(out)
}

pub fn prompt(out: &mut impl Write) -> io::Result<()> {
    write!(out, "\n🎯 njagu> ")?;
    out.flush()
}

pub fn farewell(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "👋 Goodbye!")
}

pub fn interrupted(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "\n\n👋 Interrupted. Type 'exit' to quit.")
}

pub fn error(out: &mut impl Write, err: &dyn std::fmt::Display) -> io::Result<()> {
    writeln!(out, "\n❌ Error: {err}")
}

pub fn task_banner(out: &mut impl Write, task: &str, workspace: &Path) -> io::Result<()> {
    writeln!(out, "\n🚀 njagu - Starting Task")?;
    writeln!(out, "📋 Task: {task}")?;
    writeln!(out, "🏢 Workspace: {}", workspace.display())?;
    rule(out)?;
    out.flush()
}

pub fn task_summary(out: &mut impl Write, result: &TaskResult) -> io::Result<()> {
    rule(out)?;
    writeln!(out, "✅ Task Status: {}", result.status)?;
    writeln!(out, "📊 Steps Completed: {}", result.steps.len())
}

pub fn task_result(out: &mut impl Write, result: &TaskResult) -> io::Result<()> {
    writeln!(out, "\n✨ Result: {}", result.final_result)
}

pub fn status(out: &mut impl Write, status: &AgentStatus) -> io::Result<()> {
    writeln!(out, "\n📊 Agent Status:")?;
    for (key, value) in status.entries() {
        writeln!(out, "  {key}: {value}")?;
    }
    Ok(())
}

pub fn created(out: &mut impl Write, message: &str) -> io::Result<()> {
    writeln!(out, "\n✅ {message}")
}

pub fn file_contents(out: &mut impl Write, contents: &str) -> io::Result<()> {
    writeln!(out, "\n📖 {contents}")
}

/// `Success:` always; `Output:` only when there is stdout, cut to
/// [`OUTPUT_PREVIEW_CHARS`] and always followed by `...`.
pub fn command_result(out: &mut impl Write, result: &CommandResult) -> io::Result<()> {
    writeln!(out, "\n⚡ Command Result:")?;
    writeln!(out, "  Success: {}", result.success)?;
    if !result.stdout.is_empty() {
        let preview: String = result.stdout.chars().take(OUTPUT_PREVIEW_CHARS).collect();
        writeln!(out, "  Output: {preview}...")?;
    }
    Ok(())
}
