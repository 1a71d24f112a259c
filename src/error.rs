use std::path::PathBuf;

/// Errors related to configuration loading and parsing.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid config value for `{key}`: {message}")]
    InvalidValue { key: &'static str, message: String },
}

/// Errors related to workspace enforcement.
#[derive(Debug, thiserror::Error)]
pub enum GuardrailError {
    #[error("Write outside workspace: `{path}` is not within `{workspace}`")]
    WriteOutsideWorkspace { path: PathBuf, workspace: PathBuf },
}

/// Errors related to shell command execution.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("Failed to spawn shell process: {0}")]
    SpawnFailed(String),

    #[error("Process execution failed: {0}")]
    ProcessFailed(String),
}

/// Errors raised by the file operations collaborator.
#[derive(Debug, thiserror::Error)]
pub enum FileOpError {
    #[error(transparent)]
    Guardrail(#[from] GuardrailError),

    #[error("{action} `{path}`: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors related to the agent and its subsystems.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Ollama not reachable at {url}: {message}")]
    OllamaUnavailable { url: String, message: String },

    #[error("Model '{model}' not available in Ollama: {message}")]
    ModelNotAvailable { model: String, message: String },

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Task logging error: {0}")]
    LoggingError(String),

    #[error("Agent status unavailable: {0}")]
    StatusUnavailable(String),
}

/// Everything a single dispatched command can fail with.
///
/// The interactive loop renders these and keeps going; the one-shot task
/// path hands them back to `main`.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    File(#[from] FileOpError),

    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}
