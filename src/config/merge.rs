use super::schema::{AppConfig, PartialConfig};
use crate::safety::defaults::default_blocklist;
use std::path::PathBuf;

pub const DEFAULT_MODEL: &str = "llama3.2";
pub const DEFAULT_WORKSPACE: &str = "./workspace";
pub const DEFAULT_SHELL_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_STEPS: usize = 25;

impl PartialConfig {
    /// Merge self with a lower-priority fallback.
    /// Self's non-None values take precedence.
    /// For blocked_patterns: REPLACE semantics (if self has Some, use it entirely).
    pub fn with_fallback(self, fallback: PartialConfig) -> PartialConfig {
        PartialConfig {
            model: self.model.or(fallback.model),
            workspace: self.workspace.or(fallback.workspace),
            shell_timeout_secs: self.shell_timeout_secs.or(fallback.shell_timeout_secs),
            max_steps: self.max_steps.or(fallback.max_steps),
            blocked_patterns: self.blocked_patterns.or(fallback.blocked_patterns),
            security_log_path: self.security_log_path.or(fallback.security_log_path),
        }
    }

    /// Convert to AppConfig, filling any remaining gaps with defaults.
    pub fn finalize(self) -> AppConfig {
        let workspace = self
            .workspace
            .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKSPACE));
        let security_log_path = self
            .security_log_path
            .unwrap_or_else(|| workspace.join("security.log"));

        AppConfig {
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            workspace,
            shell_timeout_secs: self.shell_timeout_secs.unwrap_or(DEFAULT_SHELL_TIMEOUT_SECS),
            max_steps: self.max_steps.unwrap_or(DEFAULT_MAX_STEPS),
            blocked_patterns: self.blocked_patterns.unwrap_or_else(default_blocklist),
            security_log_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_partial_finalizes_to_defaults() {
        let config = PartialConfig::default().finalize();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.workspace, PathBuf::from(DEFAULT_WORKSPACE));
        assert_eq!(config.shell_timeout_secs, 30);
        assert_eq!(config.max_steps, 25);
        assert_eq!(config.blocked_patterns.len(), default_blocklist().len());
        assert_eq!(
            config.security_log_path,
            PathBuf::from(DEFAULT_WORKSPACE).join("security.log")
        );
    }

    #[test]
    fn higher_priority_values_win() {
        let cli = PartialConfig {
            model: Some("qwen2.5:7b".into()),
            ..Default::default()
        };
        let file = PartialConfig {
            model: Some("llama3.2".into()),
            shell_timeout_secs: Some(90),
            ..Default::default()
        };

        let config = cli.with_fallback(file).finalize();
        assert_eq!(config.model, "qwen2.5:7b");
        assert_eq!(config.shell_timeout_secs, 90);
    }

    #[test]
    fn blocklist_is_replaced_not_merged() {
        let file = PartialConfig {
            blocked_patterns: Some(vec![("foo".into(), "no foo".into())]),
            ..Default::default()
        };
        let config = PartialConfig::default().with_fallback(file).finalize();
        assert_eq!(config.blocked_patterns, vec![("foo".to_string(), "no foo".to_string())]);
    }

    #[test]
    fn security_log_follows_workspace() {
        let partial = PartialConfig {
            workspace: Some(PathBuf::from("/tmp/ws")),
            ..Default::default()
        };
        let config = partial.finalize();
        assert_eq!(config.security_log_path, PathBuf::from("/tmp/ws/security.log"));
    }
}
