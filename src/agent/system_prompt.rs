//! System prompt assembly for a single task.

use std::path::Path;

/// Operator instructions are picked up from this file in the workspace, if present.
pub const OPERATOR_PROMPT_FILE: &str = "SYSTEM_PROMPT.md";

/// Build the system prompt: environment, tools, working rules, and any
/// operator instructions found in `SYSTEM_PROMPT.md`. The file is re-read
/// for every task so edits take effect without a restart.
pub async fn build_system_prompt(
    workspace: &Path,
    model: &str,
    tool_descriptions: &str,
    max_steps: usize,
) -> String {
    let workspace_display = workspace.display();

    let mut prompt = format!(
        "\
You are an autonomous agent. You receive one task at a time and carry it out \
by calling tools, then reply with a short plain-text summary of the outcome.

## Environment
- Model: {model}
- Workspace: {workspace_display}
- Shell commands execute in the workspace directory

## Available Tools
{tool_descriptions}

## Rules
- Break the task into small steps and use one tool call per step
- You have at most {max_steps} tool calls for this task
- File writes are restricted to the workspace directory
- Shell commands are filtered against a security blocklist and have a timeout
- When the task is done, answer with text only (no tool call); that answer \
is reported to the user as the result"
    );

    match tokio::fs::read_to_string(workspace.join(OPERATOR_PROMPT_FILE)).await {
        Ok(operator) if !operator.trim().is_empty() => {
            prompt.push_str("\n\n## Operator Instructions\n\n");
            prompt.push_str(operator.trim_end());
        }
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Failed to read {OPERATOR_PROMPT_FILE}: {e}"),
    }

    prompt
}
