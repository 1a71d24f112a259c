pub mod merge;
pub mod schema;

pub use schema::*;

use crate::cli::Cli;
use crate::error::ConfigError;
use std::path::{Path, PathBuf};

/// Load configuration by merging global, workspace, and CLI sources.
/// Precedence: CLI > explicit `--config` file or workspace config > global config > defaults.
///
/// Missing implicit config files are handled gracefully (defaults apply). An
/// explicit `--config` file must exist and parse.
pub fn load_config(cli: &Cli) -> Result<AppConfig, ConfigError> {
    // Layer 1: Global config (~/.config/njagu/njagu.toml or platform equivalent)
    let global = load_global_config();

    // Layer 2: explicit --config file, or workspace/njagu.toml
    let local = match &cli.config {
        Some(path) => load_explicit_config(path)?,
        None => {
            let workspace_path = cli
                .workspace
                .clone()
                .or_else(|| global.workspace.clone())
                .unwrap_or_else(|| PathBuf::from(merge::DEFAULT_WORKSPACE));
            load_workspace_config(&workspace_path)
        }
    };

    // Layer 3: CLI args (converted to PartialConfig)
    let cli_partial = cli_to_partial(cli);

    // Merge: CLI > local > global > defaults
    let config = cli_partial
        .with_fallback(local)
        .with_fallback(global)
        .finalize();
    validate(&config)?;
    Ok(config)
}

/// A zero step budget or timeout would make every task or command fail.
fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    if config.max_steps == 0 {
        return Err(ConfigError::InvalidValue {
            key: "max_steps",
            message: "must be at least 1".to_string(),
        });
    }
    if config.shell_timeout_secs == 0 {
        return Err(ConfigError::InvalidValue {
            key: "shell_timeout_secs",
            message: "must be at least 1 second".to_string(),
        });
    }
    Ok(())
}

/// Load global config from the platform-specific config directory.
/// Returns empty PartialConfig if file not found.
fn load_global_config() -> PartialConfig {
    match global_config_path() {
        Some(p) => load_toml_file(&p).unwrap_or_default(),
        None => {
            tracing::debug!("Could not determine global config directory");
            PartialConfig::default()
        }
    }
}

/// Load workspace config from workspace/njagu.toml.
/// Returns empty PartialConfig if file not found.
fn load_workspace_config(workspace_path: &Path) -> PartialConfig {
    let config_path = workspace_path.join("njagu.toml");
    load_toml_file(&config_path).unwrap_or_default()
}

/// Load a config file the user asked for by name. Unlike the implicit
/// layers, a missing or malformed file is an error.
fn load_explicit_config(path: &Path) -> Result<PartialConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
        path: path.to_path_buf(),
        source,
    })?;
    let partial = parse_config(&contents, path)?;
    tracing::info!("Loaded config from {}", path.display());
    Ok(partial)
}

fn parse_config(contents: &str, path: &Path) -> Result<PartialConfig, ConfigError> {
    toml::from_str::<ConfigFile>(contents)
        .map(|file| file.to_partial())
        .map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// Load and parse a TOML config file into a PartialConfig.
/// Returns None on file-not-found; parse errors are logged and skipped.
fn load_toml_file(path: &Path) -> Option<PartialConfig> {
    match std::fs::read_to_string(path) {
        Ok(contents) => match parse_config(&contents, path) {
            Ok(partial) => {
                tracing::info!("Loaded config from {}", path.display());
                Some(partial)
            }
            Err(e) => {
                tracing::warn!("Config parse error: {}", e);
                None
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file at {}, using defaults", path.display());
            None
        }
        Err(e) => {
            tracing::warn!("Failed to read config at {}: {}", path.display(), e);
            None
        }
    }
}

/// Resolve the platform-specific global config path.
/// Linux: ~/.config/njagu/njagu.toml
/// macOS: ~/Library/Application Support/njagu/njagu.toml
fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "njagu")
        .map(|dirs| dirs.config_dir().join("njagu.toml"))
}

/// Convert CLI arguments to a PartialConfig for merging.
fn cli_to_partial(cli: &Cli) -> PartialConfig {
    PartialConfig {
        model: cli.model.clone(),
        workspace: cli.workspace.clone(),
        shell_timeout_secs: cli.timeout,
        max_steps: cli.max_steps,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn parse_config_reads_all_sections() {
        let toml = r#"
[general]
model = "qwen2.5:7b"
workspace = "/srv/ws"

[agent]
max_steps = 7

[safety]
shell_timeout_secs = 12
security_log = "/var/log/njagu.log"
blocked_patterns = [{ pattern = "\\bcurl\\b", reason = "no network" }]
"#;
        let partial = parse_config(toml, Path::new("njagu.toml")).unwrap();
        assert_eq!(partial.model.as_deref(), Some("qwen2.5:7b"));
        assert_eq!(partial.workspace, Some(PathBuf::from("/srv/ws")));
        assert_eq!(partial.max_steps, Some(7));
        assert_eq!(partial.shell_timeout_secs, Some(12));
        assert_eq!(partial.security_log_path, Some(PathBuf::from("/var/log/njagu.log")));
        assert_eq!(
            partial.blocked_patterns,
            Some(vec![(r"\bcurl\b".to_string(), "no network".to_string())])
        );
    }

    #[test]
    fn parse_config_rejects_bad_toml() {
        let err = parse_config("[general\nmodel = ", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn workspace_config_is_picked_up() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("njagu.toml"),
            "[agent]\nmax_steps = 3\n",
        )
        .unwrap();

        let ws = tmp.path().to_str().unwrap();
        let cli = Cli::parse_from(["njagu", "--workspace", ws]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.max_steps, 3);
        assert_eq!(config.workspace, tmp.path());
    }

    #[test]
    fn cli_flags_override_workspace_config() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("njagu.toml"),
            "[safety]\nshell_timeout_secs = 99\n",
        )
        .unwrap();

        let ws = tmp.path().to_str().unwrap();
        let cli = Cli::parse_from(["njagu", "--workspace", ws, "--timeout", "4"]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.shell_timeout_secs, 4);
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope.toml");
        let cli = Cli::parse_from(["njagu", "--config", missing.to_str().unwrap()]);
        let err = load_config(&cli).unwrap_err();
        assert!(matches!(err, ConfigError::IoError { .. }));
    }

    #[test]
    fn zero_step_budget_or_timeout_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let ws = tmp.path().to_str().unwrap();

        let cli = Cli::parse_from(["njagu", "--workspace", ws, "--max-steps", "0"]);
        let err = load_config(&cli).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "max_steps", .. }));

        std::fs::write(
            tmp.path().join("njagu.toml"),
            "[safety]\nshell_timeout_secs = 0\n",
        )
        .unwrap();
        let cli = Cli::parse_from(["njagu", "--workspace", ws]);
        let err = load_config(&cli).unwrap_err();
        assert!(err.to_string().contains("shell_timeout_secs"));
    }
}
