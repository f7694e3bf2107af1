//! Git commit-id lookup
//!
//! The identity resolver only needs one question answered: "what commit is
//! this working tree at?". `CommitQuery` is that seam; `GitCli` answers it
//! by shelling out to git.

use crate::error::{VcpkgError, VcpkgResult};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Resolves the current commit of a git working tree
#[async_trait]
pub trait CommitQuery: Send + Sync {
    /// Commit id of the working tree rooted at `dir`
    async fn commit_id(&self, dir: &Path) -> VcpkgResult<String>;
}

/// Commit query backed by the `git` executable
#[derive(Debug, Default, Clone, Copy)]
pub struct GitCli;

impl GitCli {
    /// Create a new git-backed query
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommitQuery for GitCli {
    async fn commit_id(&self, dir: &Path) -> VcpkgResult<String> {
        let args = ["log", "-1", "--format=%H"];
        debug!("Executing: git {:?} in {}", args, dir.display());

        let output = Command::new("git")
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| VcpkgError::command_failed(format!("git {:?}", args), e))?;

        if !output.status.success() {
            return Err(VcpkgError::CommitQuery {
                dir: dir.to_path_buf(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let commit = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if commit.is_empty() {
            return Err(VcpkgError::CommitQuery {
                dir: dir.to_path_buf(),
                reason: "git log returned no commit".to_string(),
            });
        }

        Ok(commit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn fails_outside_a_repository() {
        let dir = TempDir::new().unwrap();
        // Either git is missing or the directory is not a repository; both are errors
        let result = GitCli::new().commit_id(dir.path()).await;
        assert!(result.is_err());
    }
}
