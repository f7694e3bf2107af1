//! Environment signals that feed the cache key
//!
//! The key builder never reads the process environment itself; callers
//! capture these once and pass them in.

use serde::Serialize;
use std::path::PathBuf;

/// Hosted-runner image OS (e.g. `ubuntu22`, `win22`)
pub const IMAGE_OS_VAR: &str = "ImageOS";
/// Hosted-runner image version (e.g. `20240101.1.0`)
pub const IMAGE_VERSION_VAR: &str = "ImageVersion";
/// Workspace root on CI runners
pub const WORKSPACE_VAR: &str = "GITHUB_WORKSPACE";

/// Read-only environment inputs for key derivation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvSignals {
    /// Explicit image OS, preferred over `platform`
    pub image_os: Option<String>,
    /// Image version, appended to the OS signal
    pub image_version: Option<String>,
    /// Workspace root advertised by the CI system
    pub workspace: Option<PathBuf>,
    /// Generic platform name (`linux`, `macos`, `windows`)
    pub platform: String,
}

impl EnvSignals {
    /// Capture signals from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Capture signals through an arbitrary lookup function
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Self {
            image_os: get(IMAGE_OS_VAR),
            image_version: get(IMAGE_VERSION_VAR),
            workspace: get(WORKSPACE_VAR).map(PathBuf::from),
            platform: std::env::consts::OS.to_string(),
        }
    }

    /// The OS identity used as the first key component
    pub fn os_identity(&self) -> &str {
        self.image_os.as_deref().unwrap_or(&self.platform)
    }
}
