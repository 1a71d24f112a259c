//! Ollama-backed agent: one tool-calling conversation per task.
//!
//! For each task the agent:
//!
//! 1. Checks that Ollama is up and the model is pulled
//! 2. Seeds a conversation with the system prompt and the task
//! 3. Streams model text to stdout as it arrives
//! 4. Runs each requested tool call through the shared [`Toolkit`], recording
//!    it as a [`TaskStep`]
//! 5. Stops at the first text-only reply (the final answer) or when the step
//!    budget runs out
//!
//! Everything is logged to a per-task JSONL file.

use std::io::Write;
use std::time::{Duration, Instant};

use futures::StreamExt;
use genai::Client;
use genai::chat::{ChatMessage, ChatOptions, ChatRequest, ChatStreamEvent, ToolCall, ToolResponse};
use uuid::Uuid;

use super::logging::{LogEntry, TaskLogger, now_iso};
use super::system_prompt::build_system_prompt;
use super::tools::{define_tools, dispatch_tool_call, tool_descriptions};
use super::{Agent, AgentStatus, TaskResult, TaskStatus, TaskStep};
use crate::config::AppConfig;
use crate::error::AgentError;
use crate::ops::Toolkit;

const OLLAMA_BASE_URL: &str = "http://localhost:11434/";
const OLLAMA_SHOW_URL: &str = "http://localhost:11434/api/show";

/// Validate that Ollama is running and the configured model is available.
async fn check_ollama_ready(model: &str) -> Result<(), AgentError> {
    let http = reqwest::Client::new();

    http.get(OLLAMA_BASE_URL)
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .map_err(|e| AgentError::OllamaUnavailable {
            url: OLLAMA_BASE_URL.to_string(),
            message: format!("Is Ollama running? {e}"),
        })?;

    let resp = http
        .post(OLLAMA_SHOW_URL)
        .json(&serde_json::json!({ "model": model }))
        .timeout(Duration::from_secs(10))
        .send()
        .await
        .map_err(|e| AgentError::ModelNotAvailable {
            model: model.to_string(),
            message: format!("Failed to query model info: {e}"),
        })?;

    if !resp.status().is_success() {
        return Err(AgentError::ModelNotAvailable {
            model: model.to_string(),
            message: format!(
                "Model not found (HTTP {}). Run `ollama pull {model}` to download it.",
                resp.status()
            ),
        });
    }

    Ok(())
}

#[derive(Debug, Default)]
struct AgentStats {
    tasks_started: u64,
    tasks_completed: u64,
    tasks_incomplete: u64,
    tasks_failed: u64,
    total_steps: u64,
    last_task: Option<String>,
    last_status: Option<String>,
}

/// Bookkeeping for one task. If the task future is dropped before
/// [`TaskRun::finish`] (Ctrl+C in the REPL), the task is recorded as interrupted.
struct TaskRun<'a> {
    stats: &'a mut AgentStats,
    finished: bool,
}

impl<'a> TaskRun<'a> {
    fn begin(stats: &'a mut AgentStats, task: &str) -> Self {
        stats.tasks_started += 1;
        stats.last_task = Some(task.to_string());
        stats.last_status = Some("running".to_string());
        Self {
            stats,
            finished: false,
        }
    }

    fn finish(&mut self, outcome: &Result<TaskResult, AgentError>) {
        self.finished = true;
        match outcome {
            Ok(result) => {
                self.stats.total_steps += result.steps.len() as u64;
                match result.status {
                    TaskStatus::Completed => self.stats.tasks_completed += 1,
                    TaskStatus::StepLimitReached => self.stats.tasks_incomplete += 1,
                }
                self.stats.last_status = Some(result.status.to_string());
            }
            Err(e) => {
                self.stats.tasks_failed += 1;
                self.stats.last_status = Some(format!("failed: {e}"));
            }
        }
    }
}

impl Drop for TaskRun<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.stats.tasks_failed += 1;
            self.stats.last_status = Some("interrupted".to_string());
        }
    }
}

pub struct LlmAgent {
    config: AppConfig,
    toolkit: Toolkit,
    client: Client,
    stats: AgentStats,
}

impl LlmAgent {
    pub fn new(config: AppConfig, toolkit: Toolkit) -> Self {
        Self {
            config,
            toolkit,
            // Defaults to Ollama for non-prefixed model names.
            client: Client::default(),
            stats: AgentStats::default(),
        }
    }
}

impl Agent for LlmAgent {
    async fn execute_autonomous(&mut self, task: &str) -> Result<TaskResult, AgentError> {
        let mut run = TaskRun::begin(&mut self.stats, task);
        let outcome = run_task(&self.config, &self.toolkit, &self.client, task).await;
        run.finish(&outcome);
        outcome
    }

    fn get_status(&self) -> Result<AgentStatus, AgentError> {
        let stats = &self.stats;
        Ok(AgentStatus {
            name: "njagu".to_string(),
            model: self.config.model.clone(),
            workspace: self.toolkit.files.workspace().display().to_string(),
            max_steps: self.config.max_steps,
            tasks_started: stats.tasks_started,
            tasks_completed: stats.tasks_completed,
            tasks_incomplete: stats.tasks_incomplete,
            tasks_failed: stats.tasks_failed,
            total_steps: stats.total_steps,
            last_task: stats.last_task.clone(),
            last_status: stats.last_status.clone(),
        })
    }
}

async fn run_task(
    config: &AppConfig,
    toolkit: &Toolkit,
    client: &Client,
    task: &str,
) -> Result<TaskResult, AgentError> {
    let started = Instant::now();
    let task_id = Uuid::new_v4().to_string();
    let workspace = toolkit.files.workspace();

    check_ollama_ready(&config.model).await?;

    let mut logger = TaskLogger::new(workspace, &task_id)?;
    logger.log_event(&LogEntry::TaskStart {
        timestamp: now_iso(),
        task_id: task_id.clone(),
        task: task.to_string(),
        model: config.model.clone(),
        workspace: workspace.display().to_string(),
    })?;
    tracing::info!(task_id = %task_id, log = %logger.log_path().display(), "Task started");

    let system_prompt =
        build_system_prompt(workspace, &config.model, &tool_descriptions(), config.max_steps).await;

    let mut chat_req = ChatRequest::from_system(&system_prompt)
        .with_tools(define_tools())
        .append_message(ChatMessage::user(task));

    let chat_options = ChatOptions::default()
        .with_capture_content(true)
        .with_capture_tool_calls(true);

    let mut steps: Vec<TaskStep> = Vec::new();
    let mut last_text: Option<String> = None;

    let (status, final_result) = loop {
        if steps.len() >= config.max_steps {
            let summary = last_text.clone().unwrap_or_else(|| {
                format!(
                    "Step limit of {} reached before the task finished",
                    config.max_steps
                )
            });
            break (TaskStatus::StepLimitReached, summary);
        }

        let stream_res = match client
            .exec_chat_stream(&config.model, chat_req.clone(), Some(&chat_options))
            .await
        {
            Ok(res) => res,
            Err(e) => {
                let message = format!("LLM stream error: {e}");
                logger.log_event(&LogEntry::Error {
                    timestamp: now_iso(),
                    step: steps.len(),
                    message: message.clone(),
                })?;
                return Err(AgentError::LlmError(message));
            }
        };

        let mut stream = stream_res.stream;
        let mut captured_text: Option<String> = None;
        let mut captured_tool_calls: Vec<ToolCall> = Vec::new();

        while let Some(event) = stream.next().await {
            match event {
                Ok(ChatStreamEvent::Chunk(chunk)) => {
                    print!("{}", chunk.content);
                    std::io::stdout().flush().ok();
                }
                Ok(ChatStreamEvent::End(end)) => {
                    if let Some(text) = end.captured_first_text() {
                        captured_text = Some(text.to_string());
                    }
                    if let Some(calls) = end.captured_tool_calls() {
                        captured_tool_calls = calls.into_iter().cloned().collect();
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    // The End event may still arrive.
                    tracing::warn!("Stream error: {e}");
                }
            }
        }
        if captured_text.is_some() {
            println!();
        }

        if let Some(ref text) = captured_text {
            logger.log_event(&LogEntry::AssistantText {
                timestamp: now_iso(),
                step: steps.len(),
                content: text.clone(),
            })?;
        }

        if captured_tool_calls.is_empty() {
            break (TaskStatus::Completed, captured_text.unwrap_or_default());
        }
        if captured_text.is_some() {
            last_text = captured_text;
        }

        chat_req = chat_req.append_message(ChatMessage::from(captured_tool_calls.clone()));

        for call in &captured_tool_calls {
            if steps.len() >= config.max_steps {
                break;
            }
            let index = steps.len() + 1;
            logger.log_event(&LogEntry::ToolCall {
                timestamp: now_iso(),
                step: index,
                call_id: call.call_id.clone(),
                fn_name: call.fn_name.clone(),
                fn_arguments: call.fn_arguments.clone(),
            })?;
            eprintln!("[step {index}] {}({})", call.fn_name, preview(&call.fn_arguments.to_string(), 100));

            let output = dispatch_tool_call(call, toolkit).await;

            logger.log_event(&LogEntry::ToolResult {
                timestamp: now_iso(),
                step: index,
                call_id: call.call_id.clone(),
                fn_name: call.fn_name.clone(),
                result: output.content.clone(),
                error: output.is_error.then(|| "tool reported an error".to_string()),
            })?;
            eprintln!("[result] {}", preview(&output.content, 200));

            chat_req = chat_req.append_message(ToolResponse::new(
                call.call_id.clone(),
                output.content.clone(),
            ));

            steps.push(TaskStep {
                index,
                tool: call.fn_name.clone(),
                arguments: call.fn_arguments.clone(),
                output: output.content,
                ok: !output.is_error,
            });
        }
    };

    logger.log_event(&LogEntry::TaskEnd {
        timestamp: now_iso(),
        task_id: task_id.clone(),
        status: status.to_string(),
        total_steps: steps.len(),
    })?;
    tracing::info!(task_id = %task_id, %status, steps = steps.len(), "Task finished");

    Ok(TaskResult {
        task_id,
        task: task.to_string(),
        status,
        steps,
        final_result,
        elapsed_secs: started.elapsed().as_secs_f64(),
    })
}

/// First `max_chars` characters of `s`, with `...` when cut.
fn preview(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let head: String = s.chars().take(max_chars).collect();
        format!("{head}...")
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// In test environments Ollama is usually down; either failure variant is fine.
    #[tokio::test]
    async fn health_check_returns_error_when_ollama_unavailable() {
        match check_ollama_ready("test-model").await {
            Err(AgentError::OllamaUnavailable { url, message }) => {
                assert!(url.contains("11434"));
                assert!(!message.is_empty());
            }
            Err(AgentError::ModelNotAvailable { model, message }) => {
                assert_eq!(model, "test-model");
                assert!(!message.is_empty());
            }
            Ok(()) => {}
            Err(other) => panic!("Unexpected error variant: {other}"),
        }
    }

    #[test]
    fn preview_cuts_on_char_boundary() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("ééééé", 2), "éé...");
    }

    fn sample_result(status: TaskStatus, steps: usize) -> TaskResult {
        TaskResult {
            task_id: "t".into(),
            task: "task".into(),
            status,
            steps: (1..=steps)
                .map(|index| TaskStep {
                    index,
                    tool: "shell_exec".into(),
                    arguments: serde_json::json!({}),
                    output: String::new(),
                    ok: true,
                })
                .collect(),
            final_result: "done".into(),
            elapsed_secs: 0.0,
        }
    }

    #[test]
    fn task_run_counts_outcomes() {
        let mut stats = AgentStats::default();

        let mut run = TaskRun::begin(&mut stats, "first");
        run.finish(&Ok(sample_result(TaskStatus::Completed, 3)));
        drop(run);

        let mut run = TaskRun::begin(&mut stats, "second");
        run.finish(&Err(AgentError::LlmError("boom".into())));
        drop(run);

        assert_eq!(stats.tasks_started, 2);
        assert_eq!(stats.tasks_completed, 1);
        assert_eq!(stats.tasks_failed, 1);
        assert_eq!(stats.total_steps, 3);
        assert_eq!(stats.last_task.as_deref(), Some("second"));
        assert_eq!(stats.last_status.as_deref(), Some("failed: LLM error: boom"));
    }

    #[test]
    fn dropped_task_run_is_interrupted() {
        let mut stats = AgentStats::default();
        drop(TaskRun::begin(&mut stats, "abandoned"));

        assert_eq!(stats.tasks_failed, 1);
        assert_eq!(stats.last_status.as_deref(), Some("interrupted"));
    }

    #[test]
    fn fresh_agent_status_is_empty() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = AppConfig {
            model: "llama3.2".into(),
            workspace: tmp.path().join("workspace"),
            shell_timeout_secs: 5,
            max_steps: 7,
            blocked_patterns: vec![],
            security_log_path: tmp.path().join("security.log"),
        };
        let toolkit = Toolkit::new(&config).unwrap();
        let agent = LlmAgent::new(config, toolkit);

        let status = agent.get_status().unwrap();
        assert_eq!(status.model, "llama3.2");
        assert_eq!(status.max_steps, 7);
        assert_eq!(status.tasks_started, 0);
        assert!(status.last_task.is_none());
    }
}
