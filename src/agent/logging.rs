//! JSONL task logger for replaying what the agent did.
//!
//! Each task writes one `task-{timestamp}-{id}.jsonl` file into
//! `{workspace_parent}/.njagu-logs/`, next to the workspace rather than in it,
//! so the agent's own `file_read`/`shell_exec` listings stay clean.
//!
//! Uses synchronous `std::fs`; entries are small and flushed one at a time.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;

use crate::error::AgentError;

/// Returns the current UTC time as an ISO 8601 string with milliseconds.
pub fn now_iso() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// One line of the task log, tagged with `event_type`.
#[derive(Debug, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum LogEntry {
    TaskStart {
        timestamp: String,
        task_id: String,
        task: String,
        model: String,
        workspace: String,
    },

    /// Text the model produced, whether commentary or the final answer.
    AssistantText {
        timestamp: String,
        step: usize,
        content: String,
    },

    ToolCall {
        timestamp: String,
        step: usize,
        call_id: String,
        fn_name: String,
        fn_arguments: serde_json::Value,
    },

    ToolResult {
        timestamp: String,
        step: usize,
        call_id: String,
        fn_name: String,
        result: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    Error {
        timestamp: String,
        step: usize,
        message: String,
    },

    TaskEnd {
        timestamp: String,
        task_id: String,
        status: String,
        total_steps: usize,
    },
}

pub struct TaskLogger {
    writer: BufWriter<fs::File>,
    log_path: PathBuf,
}

impl TaskLogger {
    /// Open a fresh log file for task `task_id` next to `workspace_path`.
    pub fn new(workspace_path: &Path, task_id: &str) -> Result<Self, AgentError> {
        let log_dir = log_dir_for(workspace_path)?;
        fs::create_dir_all(&log_dir).map_err(log_err)?;

        let stamp = Utc::now().format("%Y-%m-%dT%H-%M-%S");
        let short_id: String = task_id.chars().take(8).collect();
        let log_path = log_dir.join(format!("task-{stamp}-{short_id}.jsonl"));

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .map_err(log_err)?;

        Ok(Self {
            writer: BufWriter::new(file),
            log_path,
        })
    }

    pub fn log_event(&mut self, event: &LogEntry) -> Result<(), AgentError> {
        serde_json::to_writer(&mut self.writer, event)
            .map_err(|e| AgentError::LoggingError(e.to_string()))?;
        self.writer.write_all(b"\n").map_err(log_err)?;
        self.writer.flush().map_err(log_err)
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}

/// `{workspace_parent}/.njagu-logs/`
fn log_dir_for(workspace_path: &Path) -> Result<PathBuf, AgentError> {
    let parent = workspace_path.parent().ok_or_else(|| {
        AgentError::LoggingError(format!(
            "Workspace path '{}' has no parent directory",
            workspace_path.display()
        ))
    })?;
    Ok(parent.join(".njagu-logs"))
}

fn log_err(e: std::io::Error) -> AgentError {
    AgentError::LoggingError(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufRead;
    use tempfile::TempDir;

    fn make_logger() -> (TaskLogger, TempDir) {
        let tmp = TempDir::new().expect("tempdir");
        let workspace = tmp.path().join("workspace");
        let logger = TaskLogger::new(&workspace, "0123456789abcdef").expect("TaskLogger::new");
        (logger, tmp)
    }

    fn read_lines(logger: &TaskLogger) -> Vec<serde_json::Value> {
        let file = fs::File::open(logger.log_path()).expect("open log");
        std::io::BufReader::new(file)
            .lines()
            .map(|l| serde_json::from_str(&l.expect("read line")).expect("valid JSON"))
            .collect()
    }

    #[test]
    fn creates_log_file_in_sibling_dir() {
        let (logger, tmp) = make_logger();
        let log_path = logger.log_path().to_owned();

        let log_dir = tmp.path().join(".njagu-logs");
        assert!(log_path.exists());
        assert!(log_path.starts_with(&log_dir));

        let name = log_path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("task-"));
        assert!(name.ends_with("-01234567.jsonl"));
    }

    #[test]
    fn task_lifecycle_writes_one_line_per_event() {
        let (mut logger, _tmp) = make_logger();

        logger
            .log_event(&LogEntry::TaskStart {
                timestamp: now_iso(),
                task_id: "t1".into(),
                task: "list files".into(),
                model: "llama3.2".into(),
                workspace: "/tmp/ws".into(),
            })
            .unwrap();
        logger
            .log_event(&LogEntry::ToolCall {
                timestamp: now_iso(),
                step: 1,
                call_id: "call_001".into(),
                fn_name: "shell_exec".into(),
                fn_arguments: serde_json::json!({"command": "ls"}),
            })
            .unwrap();
        logger
            .log_event(&LogEntry::TaskEnd {
                timestamp: now_iso(),
                task_id: "t1".into(),
                status: "completed".into(),
                total_steps: 1,
            })
            .unwrap();

        let lines = read_lines(&logger);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["event_type"], "task_start");
        assert_eq!(lines[0]["task"], "list files");
        assert_eq!(lines[1]["event_type"], "tool_call");
        assert_eq!(lines[1]["fn_arguments"]["command"], "ls");
        assert_eq!(lines[2]["event_type"], "task_end");
        assert_eq!(lines[2]["total_steps"], 1);
    }

    #[test]
    fn tool_result_without_error_omits_field() {
        let (mut logger, _tmp) = make_logger();

        logger
            .log_event(&LogEntry::ToolResult {
                timestamp: now_iso(),
                step: 1,
                call_id: "call_ok".into(),
                fn_name: "shell_exec".into(),
                result: "ok".into(),
                error: None,
            })
            .unwrap();

        let lines = read_lines(&logger);
        assert_eq!(lines[0]["event_type"], "tool_result");
        assert!(lines[0].get("error").is_none());
    }

    #[test]
    fn error_event_keeps_message() {
        let (mut logger, _tmp) = make_logger();

        logger
            .log_event(&LogEntry::Error {
                timestamp: now_iso(),
                step: 4,
                message: "Ollama connection lost".into(),
            })
            .unwrap();

        let lines = read_lines(&logger);
        assert_eq!(lines[0]["event_type"], "error");
        assert_eq!(lines[0]["step"], 4);
        assert_eq!(lines[0]["message"], "Ollama connection lost");
    }
}
