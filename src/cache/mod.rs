//! Cache key engine
//!
//! Derives the cache key for a vcpkg checkout and decides whether a new
//! cache entry has to be written.
//!
//! # Pipeline
//!
//! | Stage | Input | Output |
//! |-------|-------|--------|
//! | Resolve identity | workspace root, vcpkg dir | commit id, submodule flag |
//! | Build keys | identity, env signals, override | primary + restore keys |
//! | Restore | keys | hit key (external store) |
//! | Decide save | keys, hit key, paths | save or skip |
//!
//! Each stage completes before the next starts. Nothing is carried between
//! runs except what the store persists under the key strings.

pub mod decision;
pub mod identity;
pub mod key;
pub mod local;
pub mod paths;
pub mod store;

pub use decision::{decide_save, save_cache, CacheDecision, SaveOutcome, SkipReason};
pub use identity::{resolve_identity, RepositoryIdentity};
pub use key::{
    build_key_set, build_key_set_with_segments, is_exact_match, select_commit, CommitSource,
    KeySet, KEY_SEGMENT_SEPARATOR,
};
pub use local::{CacheState, LocalCacheStore};
pub use paths::normalize_paths;
pub use store::{CacheStore, StoreSaveResult};

use crate::env::EnvSignals;
use crate::git::CommitQuery;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Resolves identities and builds key sets for one workspace
pub struct CacheKeyEngine<'a> {
    workspace_root: PathBuf,
    env: EnvSignals,
    query: &'a dyn CommitQuery,
    extra_segments: Vec<String>,
}

impl<'a> CacheKeyEngine<'a> {
    /// Create an engine for `workspace_root`
    pub fn new(workspace_root: impl Into<PathBuf>, env: EnvSignals, query: &'a dyn CommitQuery) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            env,
            query,
            extra_segments: Vec::new(),
        }
    }

    /// Append configured segments after the identity segment
    pub fn with_segments(mut self, segments: Vec<String>) -> Self {
        self.extra_segments = segments;
        self
    }

    /// Workspace root this engine resolves against
    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Environment signals folded into keys
    pub fn env(&self) -> &EnvSignals {
        &self.env
    }

    /// Resolve the identity of `vcpkg_dir`, degrading to an absent identity
    /// when the commit query fails
    pub async fn identity(&self, vcpkg_dir: &Path) -> RepositoryIdentity {
        match resolve_identity(&self.workspace_root, vcpkg_dir, self.query).await {
            Ok(identity) => identity,
            Err(e) => {
                warn!(
                    "Could not determine the vcpkg commit in {}: {}",
                    vcpkg_dir.display(),
                    e
                );
                RepositoryIdentity::default()
            }
        }
    }

    /// Build the key set for an already resolved identity
    pub fn key_set(&self, identity: &RepositoryIdentity, user_override: Option<&str>) -> KeySet {
        build_key_set_with_segments(identity, &self.env, user_override, &self.extra_segments)
    }

    /// Resolve the identity of `vcpkg_dir` and build its key set
    pub async fn compute(
        &self,
        vcpkg_dir: &Path,
        user_override: Option<&str>,
    ) -> (RepositoryIdentity, KeySet) {
        let identity = self.identity(vcpkg_dir).await;
        let keys = self.key_set(&identity, user_override);
        (identity, keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{VcpkgError, VcpkgResult};
    use async_trait::async_trait;
    use std::fs;
    use tempfile::TempDir;

    struct FailingQuery;

    #[async_trait]
    impl CommitQuery for FailingQuery {
        async fn commit_id(&self, dir: &Path) -> VcpkgResult<String> {
            Err(VcpkgError::CommitQuery {
                dir: dir.to_path_buf(),
                reason: "fatal: not a git repository".to_string(),
            })
        }
    }

    fn env() -> EnvSignals {
        EnvSignals {
            image_os: Some("win22".to_string()),
            image_version: None,
            workspace: None,
            platform: "windows".to_string(),
        }
    }

    #[tokio::test]
    async fn query_failure_degrades_to_override() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("vcpkg/.git")).unwrap();

        let query = FailingQuery;
        let engine = CacheKeyEngine::new(root.path(), env(), &query);
        let (identity, keys) = engine.compute(Path::new("vcpkg"), Some("deadbeef")).await;

        assert_eq!(identity, RepositoryIdentity::default());
        assert_eq!(keys.primary, "runnerOS=win22-vcpkgGitCommit=deadbeef");
    }

    #[tokio::test]
    async fn configured_segments_produce_restore_keys() {
        let root = TempDir::new().unwrap();
        let modules = root.path().join(".git/modules/vcpkg");
        fs::create_dir_all(&modules).unwrap();
        fs::write(modules.join("HEAD"), "abc123\n").unwrap();

        let query = FailingQuery;
        let engine = CacheKeyEngine::new(root.path(), env(), &query)
            .with_segments(vec!["x64-windows".to_string()]);
        let (identity, keys) = engine.compute(Path::new("vcpkg"), None).await;

        assert!(identity.is_submodule());
        assert_eq!(keys.primary, "runnerOS=win22-vcpkgGitCommit=abc123_x64-windows");
        assert_eq!(keys.restore_keys, vec!["runnerOS=win22-vcpkgGitCommit=abc123"]);
    }
}
