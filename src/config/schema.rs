//! Configuration schema for vcpkg-cache
//!
//! Read from `vcpkg-cache.toml` in the workspace or
//! `~/.config/vcpkg-cache/config.toml`.

use crate::manifest::{DEFAULT_MANIFEST_GLOB, DEFAULT_MANIFEST_IGNORE};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// vcpkg checkout settings
    pub vcpkg: VcpkgConfig,

    /// Cache settings
    pub cache: CacheConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// vcpkg checkout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VcpkgConfig {
    /// vcpkg directory, relative to the workspace root unless absolute
    pub directory: PathBuf,

    /// Commit id to use when none can be detected
    pub commit_id: Option<String>,

    /// Glob locating the vcpkg.json manifest
    pub manifest_glob: String,

    /// Globs excluded from the manifest search
    pub manifest_ignore: Vec<String>,
}

impl Default for VcpkgConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("vcpkg"),
            commit_id: None,
            manifest_glob: DEFAULT_MANIFEST_GLOB.to_string(),
            manifest_ignore: DEFAULT_MANIFEST_IGNORE
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable restoring and saving (default: true)
    pub enabled: bool,

    /// Local store directory (default: user cache dir)
    pub store_dir: Option<PathBuf>,

    /// Paths cached in addition to the vcpkg executable
    pub extra_paths: Vec<String>,

    /// Key segments appended after the image/commit segment
    pub key_segments: Vec<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            store_dir: None,
            extra_paths: vec![],
            key_segments: vec![],
        }
    }
}
