//! The autonomous agent collaborator.
//!
//! The dispatcher only knows the [`Agent`] trait. [`llm_agent::LlmAgent`] is
//! the real implementation: a tool-calling loop against a local Ollama model.

pub mod llm_agent;
pub mod logging;
pub mod system_prompt;
pub mod tools;

use std::fmt;
use std::future::Future;

use serde::Serialize;

use crate::error::AgentError;

pub use llm_agent::LlmAgent;

/// Something that can take a free-form task and work it to completion.
pub trait Agent {
    /// Run `task` until the agent produces a final answer or gives up.
    fn execute_autonomous(
        &mut self,
        task: &str,
    ) -> impl Future<Output = Result<TaskResult, AgentError>>;

    /// Snapshot of the agent's counters and settings.
    fn get_status(&self) -> Result<AgentStatus, AgentError>;
}

/// How a task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// The model gave a final answer.
    Completed,
    /// The step budget ran out first.
    StepLimitReached,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TaskStatus::Completed => "completed",
            TaskStatus::StepLimitReached => "step_limit_reached",
        })
    }
}

/// One tool invocation made while working on a task.
#[derive(Debug, Clone, Serialize)]
pub struct TaskStep {
    /// 1-based position within the task.
    pub index: usize,
    pub tool: String,
    pub arguments: serde_json::Value,
    pub output: String,
    pub ok: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskResult {
    pub task_id: String,
    pub task: String,
    pub status: TaskStatus,
    pub steps: Vec<TaskStep>,
    pub final_result: String,
    pub elapsed_secs: f64,
}

/// Agent status report. Rendered field by field, in declaration order.
#[derive(Debug, Clone, Serialize)]
pub struct AgentStatus {
    pub name: String,
    pub model: String,
    pub workspace: String,
    pub max_steps: usize,
    pub tasks_started: u64,
    pub tasks_completed: u64,
    pub tasks_incomplete: u64,
    pub tasks_failed: u64,
    pub total_steps: u64,
    pub last_task: Option<String>,
    pub last_status: Option<String>,
}

impl AgentStatus {
    /// `(key, value)` pairs in display order. Unset optional fields show as `none`.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let or_none = |v: &Option<String>| v.clone().unwrap_or_else(|| "none".to_string());
        vec![
            ("name", self.name.clone()),
            ("model", self.model.clone()),
            ("workspace", self.workspace.clone()),
            ("max_steps", self.max_steps.to_string()),
            ("tasks_started", self.tasks_started.to_string()),
            ("tasks_completed", self.tasks_completed.to_string()),
            ("tasks_incomplete", self.tasks_incomplete.to_string()),
            ("tasks_failed", self.tasks_failed.to_string()),
            ("total_steps", self.total_steps.to_string()),
            ("last_task", or_none(&self.last_task)),
            ("last_status", or_none(&self.last_status)),
        ]
    }
}
