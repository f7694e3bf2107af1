//! Per-invocation context shared by commands

use crate::bootstrap::default_cache_paths;
use crate::cache::identity::absolute_target;
use crate::cache::LocalCacheStore;
use crate::cli::args::{KeyArgs, VcpkgDirArgs};
use crate::config::{Config, ConfigManager};
use crate::env::EnvSignals;
use std::path::{Path, PathBuf};

/// Resolved workspace, environment and configuration
#[derive(Debug, Clone)]
pub struct Context {
    /// Workspace root all relative paths resolve against
    pub workspace: PathBuf,
    /// Environment signals captured at startup
    pub env: EnvSignals,
    /// Loaded configuration
    pub config: Config,
    /// Path the configuration was loaded from (or would be)
    pub config_path: PathBuf,
}

impl Context {
    /// Absolute vcpkg directory: CLI flag, then config
    pub fn vcpkg_dir(&self, args: &VcpkgDirArgs) -> PathBuf {
        let dir = args
            .vcpkg_dir
            .clone()
            .unwrap_or_else(|| self.config.vcpkg.directory.clone());
        absolute_target(&self.workspace, &dir)
    }

    /// Commit id override: CLI flag (or its env var), then config
    pub fn commit_override<'a>(&'a self, args: &'a KeyArgs) -> Option<&'a str> {
        args.commit_id
            .as_deref()
            .or(self.config.vcpkg.commit_id.as_deref())
    }

    /// Local store configured for this run
    pub fn store(&self) -> LocalCacheStore {
        let root = self
            .config
            .cache
            .store_dir
            .as_ref()
            .map(|dir| absolute_target(&self.workspace, dir))
            .unwrap_or_else(ConfigManager::default_store_dir);
        LocalCacheStore::new(root)
    }

    /// Paths cached by default: the vcpkg executable plus configured extras
    pub fn cache_paths(&self, vcpkg_dir: &Path) -> Vec<String> {
        let mut paths = default_cache_paths(vcpkg_dir, &self.env.platform);
        paths.extend(self.config.cache.extra_paths.iter().map(|p| {
            absolute_target(&self.workspace, Path::new(p))
                .display()
                .to_string()
        }));
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::OutputFormat;

    fn context() -> Context {
        let mut config = Config::default();
        config.vcpkg.commit_id = Some("fromconfig".to_string());
        config.cache.extra_paths = vec!["build/vcpkg_installed".to_string()];
        config.cache.store_dir = Some(PathBuf::from(".cache"));

        Context {
            workspace: PathBuf::from("/work"),
            env: EnvSignals {
                image_os: None,
                image_version: None,
                workspace: None,
                platform: "linux".to_string(),
            },
            config,
            config_path: PathBuf::from("/work/vcpkg-cache.toml"),
        }
    }

    fn key_args(commit_id: Option<&str>, vcpkg_dir: Option<&str>) -> KeyArgs {
        KeyArgs {
            dir: VcpkgDirArgs {
                vcpkg_dir: vcpkg_dir.map(PathBuf::from),
            },
            commit_id: commit_id.map(str::to_string),
            format: OutputFormat::Table,
        }
    }

    #[test]
    fn vcpkg_dir_prefers_flag() {
        let ctx = context();
        assert_eq!(
            ctx.vcpkg_dir(&key_args(None, None).dir),
            PathBuf::from("/work/vcpkg")
        );
        assert_eq!(
            ctx.vcpkg_dir(&key_args(None, Some("/opt/vcpkg")).dir),
            PathBuf::from("/opt/vcpkg")
        );
    }

    #[test]
    fn commit_override_prefers_flag() {
        let ctx = context();
        let flag = key_args(Some("fromflag"), None);
        let none = key_args(None, None);
        assert_eq!(ctx.commit_override(&flag), Some("fromflag"));
        assert_eq!(ctx.commit_override(&none), Some("fromconfig"));
    }

    #[test]
    fn cache_paths_include_extras() {
        let ctx = context();
        assert_eq!(
            ctx.cache_paths(Path::new("/work/vcpkg")),
            vec!["/work/vcpkg/vcpkg", "/work/build/vcpkg_installed"]
        );
        assert_eq!(ctx.store().root(), Path::new("/work/.cache"));
    }
}
