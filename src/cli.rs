use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "njagu",
    version,
    about = "Interactive command shell for an autonomous task agent"
)]
pub struct Cli {
    /// Ollama model name (e.g., "llama3.2", "qwen2.5:7b")
    #[arg(short, long)]
    pub model: Option<String>,

    /// Workspace directory path
    #[arg(short, long)]
    pub workspace: Option<PathBuf>,

    /// Shell command timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Maximum tool calls the agent may make for one task
    #[arg(long)]
    pub max_steps: Option<usize>,

    /// Path to config file (replaces the workspace njagu.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Task to run once without entering interactive mode
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub task: Vec<String>,
}

impl Cli {
    /// The one-shot task, if any: positional words joined with single spaces.
    pub fn task(&self) -> Option<String> {
        if self.task.is_empty() {
            None
        } else {
            Some(self.task.join(" "))
        }
    }
}
