use std::path::{Component, Path, PathBuf};

use crate::error::GuardrailError;

/// Keeps file creation inside the workspace.
///
/// Reads are unrestricted; writes must land inside the canonical workspace
/// root, both lexically and after symlinks are resolved.
#[derive(Debug, Clone)]
pub struct WorkspaceGuard {
    canonical_root: PathBuf,
}

impl WorkspaceGuard {
    /// Create a guard for `workspace_path`, creating the directory if needed.
    pub fn new(workspace_path: &Path) -> std::io::Result<Self> {
        std::fs::create_dir_all(workspace_path)?;
        let canonical_root = std::fs::canonicalize(workspace_path)?;
        Ok(Self { canonical_root })
    }

    pub fn canonical_root(&self) -> &Path {
        &self.canonical_root
    }

    /// Resolve a user-supplied name: absolute paths are taken as-is, relative
    /// ones are joined onto the workspace root.
    pub fn resolve(&self, name: &str) -> PathBuf {
        let path = Path::new(name);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.canonical_root.join(path)
        }
    }

    /// Resolve `name` as a write target, rejecting anything that escapes the
    /// workspace through `..` or an absolute path. The check is lexical, so it
    /// can run before any parent directory is created.
    pub fn resolve_write_target(&self, name: &str) -> Result<PathBuf, GuardrailError> {
        let target = normalize(&self.resolve(name));
        if target.starts_with(&self.canonical_root) && target != self.canonical_root {
            Ok(target)
        } else {
            Err(GuardrailError::WriteOutsideWorkspace {
                path: PathBuf::from(name),
                workspace: self.canonical_root.clone(),
            })
        }
    }

    /// Check if a write to the given path is allowed.
    /// Resolves symlinks to prevent escape via symlink traversal.
    pub fn is_write_allowed(&self, target: &Path) -> Result<bool, std::io::Error> {
        let canonical = if target.exists() {
            std::fs::canonicalize(target)?
        } else {
            let parent = target.parent().ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no parent")
            })?;
            if !parent.exists() {
                return Ok(false);
            }
            std::fs::canonicalize(parent)?.join(target.file_name().unwrap_or_default())
        };

        Ok(canonical.starts_with(&self.canonical_root))
    }
}

/// Collapse `.` and `..` components without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
