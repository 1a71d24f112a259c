use serde::Deserialize;
use std::path::PathBuf;

/// The TOML file structure for njagu.toml.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    pub general: Option<GeneralConfig>,
    pub agent: Option<AgentConfig>,
    pub safety: Option<SafetyConfig>,
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    pub model: Option<String>,
    pub workspace: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AgentConfig {
    pub max_steps: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SafetyConfig {
    pub shell_timeout_secs: Option<u64>,
    /// If specified, fully replaces the default blocklist.
    pub blocked_patterns: Option<Vec<BlocklistEntry>>,
    pub security_log: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlocklistEntry {
    pub pattern: String,
    pub reason: String,
}

/// Fully-resolved runtime configuration. All fields have values.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub model: String,
    pub workspace: PathBuf,
    pub shell_timeout_secs: u64,
    pub max_steps: usize,
    pub blocked_patterns: Vec<(String, String)>,
    pub security_log_path: PathBuf,
}

/// Partial config used during merge. All fields are Option so that
/// missing fields don't override lower-priority values.
#[derive(Debug, Clone, Default)]
pub struct PartialConfig {
    pub model: Option<String>,
    pub workspace: Option<PathBuf>,
    pub shell_timeout_secs: Option<u64>,
    pub max_steps: Option<usize>,
    pub blocked_patterns: Option<Vec<(String, String)>>,
    pub security_log_path: Option<PathBuf>,
}

impl ConfigFile {
    /// Flatten the sectioned file layout into a mergeable partial config.
    pub fn to_partial(&self) -> PartialConfig {
        let general = self.general.as_ref();
        let safety = self.safety.as_ref();

        PartialConfig {
            model: general.and_then(|g| g.model.clone()),
            workspace: general.and_then(|g| g.workspace.as_ref().map(PathBuf::from)),
            shell_timeout_secs: safety.and_then(|s| s.shell_timeout_secs),
            max_steps: self.agent.as_ref().and_then(|a| a.max_steps),
            blocked_patterns: safety.and_then(|s| {
                s.blocked_patterns.as_ref().map(|entries| {
                    entries
                        .iter()
                        .map(|e| (e.pattern.clone(), e.reason.clone()))
                        .collect()
                })
            }),
            security_log_path: safety.and_then(|s| s.security_log.as_ref().map(PathBuf::from)),
        }
    }
}
