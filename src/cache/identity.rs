//! Repository identity detection
//!
//! Decides whether the vcpkg directory is a submodule of the workspace, an
//! ordinary clone, or not a git tree at all, and finds its commit id.

use crate::error::{VcpkgError, VcpkgResult};
use crate::git::CommitQuery;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Commit identity of the vcpkg checkout
///
/// Both fields are `None` when the directory is not tracked by git from the
/// workspace's point of view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepositoryIdentity {
    /// Current commit id
    pub commit_id: Option<String>,
    /// Whether the commit pointer lives in the parent's submodule metadata
    pub is_submodule: Option<bool>,
}

impl RepositoryIdentity {
    /// Identity of a submodule at `commit_id`
    pub fn submodule(commit_id: impl Into<String>) -> Self {
        Self {
            commit_id: Some(commit_id.into()),
            is_submodule: Some(true),
        }
    }

    /// Identity of an ordinary clone at `commit_id`
    pub fn checkout(commit_id: impl Into<String>) -> Self {
        Self {
            commit_id: Some(commit_id.into()),
            is_submodule: Some(false),
        }
    }

    /// True when a submodule was detected
    pub fn is_submodule(&self) -> bool {
        self.is_submodule == Some(true)
    }
}

/// Absolute form of `target_dir`, joined onto `workspace_root` when relative
pub fn absolute_target(workspace_root: &Path, target_dir: &Path) -> PathBuf {
    if target_dir.is_absolute() {
        target_dir.to_path_buf()
    } else {
        workspace_root.join(target_dir)
    }
}

/// Where git would keep HEAD for `target_dir` if it were a submodule
///
/// Returns `None` for targets outside the workspace root.
pub fn submodule_head_path(workspace_root: &Path, target_dir: &Path) -> Option<PathBuf> {
    let target = absolute_target(workspace_root, target_dir);
    let relative = target.strip_prefix(workspace_root).ok()?;
    if relative.as_os_str().is_empty() {
        return None;
    }

    Some(
        workspace_root
            .join(".git")
            .join("modules")
            .join(relative)
            .join("HEAD"),
    )
}

/// Resolve the identity of `target_dir` relative to `workspace_root`
///
/// Submodule metadata is checked first and always wins over a `.git` entry
/// in the target itself. Errors only come from reading the submodule HEAD or
/// from `query`.
pub async fn resolve_identity(
    workspace_root: &Path,
    target_dir: &Path,
    query: &dyn CommitQuery,
) -> VcpkgResult<RepositoryIdentity> {
    let target = absolute_target(workspace_root, target_dir);

    if let Some(head) = submodule_head_path(workspace_root, &target) {
        if head.is_file() {
            let contents = fs::read_to_string(&head).map_err(|e| VcpkgError::SubmoduleHead {
                path: head.clone(),
                source: e,
            })?;
            let commit = contents.trim().to_string();
            debug!(
                "{} is a submodule at {} (from {})",
                target.display(),
                commit,
                head.display()
            );
            return Ok(RepositoryIdentity::submodule(commit));
        }
    }

    if target.join(".git").exists() {
        let commit = query.commit_id(&target).await?;
        debug!("{} is a git checkout at {}", target.display(), commit);
        return Ok(RepositoryIdentity::checkout(commit));
    }

    info!(
        "{} is not a git repository or submodule of {}",
        target.display(),
        workspace_root.display()
    );
    Ok(RepositoryIdentity::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Fixed-answer query that counts calls
    struct FixedQuery {
        commit: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl FixedQuery {
        fn new(commit: Option<&'static str>) -> Self {
            Self {
                commit,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CommitQuery for FixedQuery {
        async fn commit_id(&self, dir: &Path) -> VcpkgResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.commit
                .map(str::to_string)
                .ok_or_else(|| VcpkgError::CommitQuery {
                    dir: dir.to_path_buf(),
                    reason: "no commit".to_string(),
                })
        }
    }

    fn write_submodule_head(root: &Path, rel: &str, contents: &str) {
        let modules = root.join(".git/modules").join(rel);
        fs::create_dir_all(&modules).unwrap();
        fs::write(modules.join("HEAD"), contents).unwrap();
    }

    #[test]
    fn relative_target_joins_root() {
        let root = Path::new("/work/repo");
        assert_eq!(
            absolute_target(root, Path::new("vcpkg")),
            PathBuf::from("/work/repo/vcpkg")
        );
        assert_eq!(
            absolute_target(root, Path::new("/opt/vcpkg")),
            PathBuf::from("/opt/vcpkg")
        );
    }

    #[test]
    fn submodule_head_path_layout() {
        let root = Path::new("/work/repo");
        assert_eq!(
            submodule_head_path(root, Path::new("deps/vcpkg")),
            Some(PathBuf::from("/work/repo/.git/modules/deps/vcpkg/HEAD"))
        );
        assert_eq!(submodule_head_path(root, Path::new("/elsewhere/vcpkg")), None);
        assert_eq!(submodule_head_path(root, root), None);
    }

    #[tokio::test]
    async fn detects_submodule() {
        let root = TempDir::new().unwrap();
        write_submodule_head(root.path(), "vcpkg", "abc123\n");
        fs::create_dir_all(root.path().join("vcpkg")).unwrap();

        let query = FixedQuery::new(None);
        let identity = resolve_identity(root.path(), Path::new("vcpkg"), &query)
            .await
            .unwrap();

        assert_eq!(identity, RepositoryIdentity::submodule("abc123"));
        assert_eq!(query.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn submodule_wins_over_git_entry() {
        let root = TempDir::new().unwrap();
        write_submodule_head(root.path(), "vcpkg", "  fromparent  ");
        fs::create_dir_all(root.path().join("vcpkg")).unwrap();
        fs::write(root.path().join("vcpkg/.git"), "gitdir: ../.git/modules/vcpkg").unwrap();

        let query = FixedQuery::new(Some("fromclone"));
        let identity = resolve_identity(root.path(), &root.path().join("vcpkg"), &query)
            .await
            .unwrap();

        assert_eq!(identity.commit_id.as_deref(), Some("fromparent"));
        assert!(identity.is_submodule());
        assert_eq!(query.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn detects_ordinary_checkout() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("vcpkg/.git")).unwrap();

        let query = FixedQuery::new(Some("def456"));
        let identity = resolve_identity(root.path(), Path::new("vcpkg"), &query)
            .await
            .unwrap();

        assert_eq!(identity, RepositoryIdentity::checkout("def456"));
        assert_eq!(query.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn untracked_directory_is_absent() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("vcpkg")).unwrap();

        let query = FixedQuery::new(Some("unused"));
        let identity = resolve_identity(root.path(), Path::new("vcpkg"), &query)
            .await
            .unwrap();

        assert_eq!(identity, RepositoryIdentity::default());
        assert_eq!(query.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn query_failure_propagates() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("vcpkg/.git")).unwrap();

        let query = FixedQuery::new(None);
        let result = resolve_identity(root.path(), Path::new("vcpkg"), &query).await;

        assert!(matches!(result, Err(VcpkgError::CommitQuery { .. })));
    }
}
