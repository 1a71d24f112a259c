//! File operations collaborator: workspace-confined creation, unrestricted reads.

use std::path::{Path, PathBuf};

use crate::error::{FileOpError, GuardrailError};
use crate::safety::workspace::WorkspaceGuard;

pub struct FileOperations {
    guard: WorkspaceGuard,
}

impl FileOperations {
    pub fn new(guard: WorkspaceGuard) -> Self {
        Self { guard }
    }

    pub fn workspace(&self) -> &Path {
        self.guard.canonical_root()
    }

    /// Create (or overwrite) `name` with `content` and return a short outcome
    /// message. Relative names resolve against the workspace; missing parent
    /// directories are created. Targets outside the workspace are refused.
    pub async fn create_file(&self, name: &str, content: &str) -> Result<String, FileOpError> {
        let path = self.writable_path(name).await?;

        tokio::fs::write(&path, content)
            .await
            .map_err(|source| FileOpError::Io {
                action: "Failed to write",
                path: path.clone(),
                source,
            })?;

        tracing::debug!(path = %path.display(), bytes = content.len(), "File written");
        Ok(format!("File created: {} ({} bytes)", name, content.len()))
    }

    /// Return the contents of `name`. Relative names resolve against the
    /// workspace, absolute ones are read as-is.
    pub async fn read_file(&self, name: &str) -> Result<String, FileOpError> {
        let path = self.guard.resolve(name);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| FileOpError::Io {
                action: "Failed to read",
                path,
                source,
            })
    }

    async fn writable_path(&self, name: &str) -> Result<PathBuf, FileOpError> {
        let path = self.guard.resolve_write_target(name)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| FileOpError::Io {
                    action: "Failed to create directories for",
                    path: path.clone(),
                    source,
                })?;
        }

        // Lexically inside, but a symlinked directory could still point out.
        let inside = self
            .guard
            .is_write_allowed(&path)
            .map_err(|source| FileOpError::Io {
                action: "Failed to resolve",
                path: path.clone(),
                source,
            })?;
        if !inside {
            return Err(GuardrailError::WriteOutsideWorkspace {
                path: PathBuf::from(name),
                workspace: self.workspace().to_path_buf(),
            }
            .into());
        }

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_ops(tmp: &TempDir) -> FileOperations {
        let guard = WorkspaceGuard::new(&tmp.path().join("workspace")).unwrap();
        FileOperations::new(guard)
    }

    #[tokio::test]
    async fn create_then_read_round_trips() {
        let tmp = TempDir::new().unwrap();
        let ops = make_ops(&tmp);

        let msg = ops.create_file("hello.txt", "hello world").await.unwrap();
        assert_eq!(msg, "File created: hello.txt (11 bytes)");
        assert_eq!(ops.read_file("hello.txt").await.unwrap(), "hello world");
    }

    #[tokio::test]
    async fn create_makes_parent_directories() {
        let tmp = TempDir::new().unwrap();
        let ops = make_ops(&tmp);

        ops.create_file("sub/dir/file.txt", "nested").await.unwrap();
        let content = std::fs::read_to_string(ops.workspace().join("sub/dir/file.txt")).unwrap();
        assert_eq!(content, "nested");
    }

    #[tokio::test]
    async fn create_outside_workspace_is_refused() {
        let tmp = TempDir::new().unwrap();
        let ops = make_ops(&tmp);

        let err = ops.create_file("../escape.txt", "nope").await.unwrap_err();
        assert!(matches!(err, FileOpError::Guardrail(_)));
        assert!(!tmp.path().join("escape.txt").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn create_through_symlinked_dir_is_refused() {
        let tmp = TempDir::new().unwrap();
        let ops = make_ops(&tmp);
        let outside = TempDir::new().unwrap();
        std::os::unix::fs::symlink(outside.path(), ops.workspace().join("link")).unwrap();

        let err = ops.create_file("link/file.txt", "nope").await.unwrap_err();
        assert!(matches!(err, FileOpError::Guardrail(_)));
        assert!(!outside.path().join("file.txt").exists());
    }

    #[tokio::test]
    async fn read_missing_file_names_the_path() {
        let tmp = TempDir::new().unwrap();
        let ops = make_ops(&tmp);

        let err = ops.read_file("no_such_file.txt").await.unwrap_err();
        assert!(err.to_string().contains("no_such_file.txt"));
    }

    #[tokio::test]
    async fn read_absolute_path_outside_workspace() {
        let tmp = TempDir::new().unwrap();
        let ops = make_ops(&tmp);
        let outside = tmp.path().join("outside.txt");
        std::fs::write(&outside, "outside content").unwrap();

        let content = ops.read_file(outside.to_str().unwrap()).await.unwrap();
        assert_eq!(content, "outside content");
    }
}
